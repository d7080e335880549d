//! Order route handlers.
//!
//! Customers place orders (directly or from their session cart); the
//! back-office lists them, quotes shipping and moves them between statuses.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument};

use bosco_core::{DeliveryType, NewOrder, Order, OrderId, OrderStatus, UserId};

use crate::db::OrderRepository;
use crate::error::{ApiJson, ApiQuery, AppError, Result};
use crate::middleware::{OptionalAuth, RequireAdmin, RequireAuth, public_write_rate_limiter};
use crate::routes::cart::{load_cart, save_cart};
use crate::state::AppState;

/// Build the order router.
pub fn router() -> Router<AppState> {
    let public_writes = Router::new()
        .route("/orders", post(create))
        .route("/checkout", post(checkout))
        .layer(public_write_rate_limiter());

    Router::new()
        .route("/orders", get(list).patch(update_status))
        .route("/orders/shipping-fee", post(set_shipping_fee))
        .route("/getorder", get(user_orders))
        .merge(public_writes)
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Query for the back-office order listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Fetch a single order instead of a page.
    pub order_id: Option<OrderId>,
    /// Cursor: the last order id of the previous page.
    pub start_after: Option<OrderId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIdQuery {
    pub order_id: Option<OrderId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrdersQuery {
    pub user_id: UserId,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingFeeRequest {
    pub order_id: OrderId,
    pub shipping_fee: Decimal,
}

/// Shipping details for checking out the session cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub shipping_phone: String,
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPageResponse {
    pub orders: Vec<Order>,
    pub last_doc_id: Option<OrderId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedResponse {
    pub success: bool,
    pub order_id: OrderId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdatedResponse {
    pub success: bool,
    pub order_id: OrderId,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingFeeResponse {
    pub success: bool,
    pub order_id: OrderId,
    pub total_price: Decimal,
}

/// Parse a status, reporting any unknown value the same way.
fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid status".to_string()))
}

fn require_order_id(order_id: Option<OrderId>) -> Result<OrderId> {
    order_id.ok_or_else(|| AppError::BadRequest("orderId is required".to_string()))
}

// =============================================================================
// Customer Handlers
// =============================================================================

/// Persist a freshly placed order and bump the order counters.
async fn place_order(
    state: &AppState,
    new_order: NewOrder,
    user_id: Option<UserId>,
) -> Result<OrderId> {
    let order = new_order.into_order(OrderId::generate(), user_id, Utc::now())?;
    OrderRepository::new(state.pool()).create(&order).await?;

    info!(
        order_id = %order.id,
        item_price = %order.item_price,
        items = order.items.len(),
        guest = user_id.is_none(),
        "Order placed"
    );

    Ok(order.id)
}

/// Place an order from submitted items.
///
/// Item prices are taken as submitted; the back-office reviews every order
/// before quoting shipping.
#[instrument(skip(state, user, new_order))]
async fn create(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    ApiJson(new_order): ApiJson<NewOrder>,
) -> Result<impl IntoResponse> {
    let order_id = place_order(&state, new_order, user.map(|u| u.id)).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            success: true,
            order_id,
        }),
    ))
}

/// Place an order from the session cart, then empty the cart.
#[instrument(skip(state, session, user, request))]
async fn checkout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let mut cart = load_cart(&session).await?;

    let new_order = NewOrder {
        items: cart.items().to_vec(),
        shipping_address: request.shipping_address,
        shipping_phone: request.shipping_phone,
        delivery_type: request.delivery_type,
        notes: request.notes,
    };
    let order_id = place_order(&state, new_order, user.map(|u| u.id)).await?;

    cart.clear();
    save_cart(&session, &cart).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            success: true,
            order_id,
        }),
    ))
}

/// A customer's own orders, optionally filtered by status.
///
/// Admins may look up any customer.
#[instrument(skip(state, user), fields(caller_id = %user.id))]
async fn user_orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(query): ApiQuery<UserOrdersQuery>,
) -> Result<Json<OrderListResponse>> {
    if query.user_id != user.id && !state.config().is_admin(&user.email) {
        return Err(AppError::Forbidden(
            "Cannot view another customer's orders".to_string(),
        ));
    }

    let status = query.status.as_deref().map(parse_status).transpose()?;
    let orders = OrderRepository::new(state.pool())
        .list_for_user(query.user_id, status)
        .await?;

    Ok(Json(OrderListResponse { orders }))
}

// =============================================================================
// Back-office Handlers
// =============================================================================

/// One order by id, or a page of orders newest first.
#[instrument(skip(state, _admin))]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<axum::response::Response> {
    let orders = OrderRepository::new(state.pool());

    if let Some(order_id) = query.order_id {
        let order = orders
            .get(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        return Ok(Json(OrderResponse { order }).into_response());
    }

    let page = orders.list_page(query.start_after).await?;
    Ok(Json(OrderPageResponse {
        orders: page.orders,
        last_doc_id: page.last_id,
    })
    .into_response())
}

/// Move an order to any status.
#[instrument(skip(state, admin, update), fields(admin_id = %admin.id))]
async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrderIdQuery>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<Json<StatusUpdatedResponse>> {
    let order_id = require_order_id(query.order_id)?;
    let status = parse_status(&update.status)?;

    OrderRepository::new(state.pool())
        .update_status(order_id, status)
        .await?;

    info!(%order_id, %status, "Order status updated");

    Ok(Json(StatusUpdatedResponse {
        success: true,
        order_id,
        status,
    }))
}

/// Quote shipping for an order and compute its total.
#[instrument(skip(state, admin, request), fields(admin_id = %admin.id, order_id = %request.order_id))]
async fn set_shipping_fee(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ShippingFeeRequest>,
) -> Result<Json<ShippingFeeResponse>> {
    let orders = OrderRepository::new(state.pool());

    let mut order = orders
        .get(request.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let total_price = order.apply_shipping_fee(request.shipping_fee)?;
    orders.update_pricing(&order).await?;

    info!(
        shipping_fee = %request.shipping_fee,
        %total_price,
        "Shipping fee quoted"
    );

    Ok(Json(ShippingFeeResponse {
        success: true,
        order_id: order.id,
        total_price,
    }))
}
