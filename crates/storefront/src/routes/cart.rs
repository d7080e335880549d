//! Cart and wishlist route handlers.
//!
//! Both live in the visitor's session, so they survive sign-in and work for
//! guests. Prices are whatever the client submitted; orders are priced from
//! them and reviewed by the back-office.

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, instrument};

use bosco_core::{Cart, CartError, CartItem, CartLineKey, ProductId, Wishlist, WishlistItem};

use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::models::session_keys;
use crate::state::AppState;

/// Build the cart and wishlist router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(show).delete(clear))
        .route("/cart/items", post(add))
        .route("/cart/items/update", post(update))
        .route("/cart/items/remove", post(remove))
        .route("/wishlist", get(wishlist).post(wishlist_add).delete(wishlist_clear))
        .route(
            "/wishlist/{product_id}",
            get(wishlist_contains).delete(wishlist_remove),
        )
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session, empty if there is none yet.
pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Store the cart in the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

async fn load_wishlist(session: &Session) -> Result<Wishlist> {
    Ok(session
        .get::<Wishlist>(session_keys::WISHLIST)
        .await?
        .unwrap_or_default())
}

async fn save_wishlist(session: &Session, wishlist: &Wishlist) -> Result<()> {
    session.insert(session_keys::WISHLIST, wishlist).await?;
    Ok(())
}

// =============================================================================
// Cart
// =============================================================================

/// Cart contents with totals.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub count: u32,
}

impl TryFrom<Cart> for CartResponse {
    type Error = CartError;

    fn try_from(cart: Cart) -> std::result::Result<Self, Self::Error> {
        let total = cart.total()?;
        let count = cart.count();
        Ok(Self {
            items: cart.into_items(),
            total,
            count,
        })
    }
}

/// A line and its new quantity.
#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    #[serde(flatten)]
    pub line: CartLineKey,
    pub quantity: u32,
}

#[instrument(skip(session))]
async fn show(session: Session) -> Result<Json<CartResponse>> {
    Ok(Json(load_cart(&session).await?.try_into()?))
}

/// Add an item, merging into an existing line with the same size and color.
#[instrument(skip(session, item), fields(product_id = %item.product_id))]
async fn add(session: Session, ApiJson(item): ApiJson<CartItem>) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.add(item)?;
    save_cart(&session, &cart).await?;

    debug!(count = cart.count(), "Added to cart");

    Ok(Json(cart.try_into()?))
}

/// Set a line's quantity; zero removes the line.
#[instrument(skip(session, update), fields(product_id = %update.line.product_id))]
async fn update(
    session: Session,
    ApiJson(update): ApiJson<QuantityUpdate>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(&update.line, update.quantity)?;
    save_cart(&session, &cart).await?;

    Ok(Json(cart.try_into()?))
}

#[instrument(skip(session, line), fields(product_id = %line.product_id))]
async fn remove(
    session: Session,
    ApiJson(line): ApiJson<CartLineKey>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    if !cart.remove(&line) {
        return Err(AppError::NotFound("Item not in cart".to_string()));
    }
    save_cart(&session, &cart).await?;

    Ok(Json(cart.try_into()?))
}

#[instrument(skip(session))]
async fn clear(session: Session) -> Result<Json<CartResponse>> {
    let cart = Cart::new();
    save_cart(&session, &cart).await?;
    Ok(Json(cart.try_into()?))
}

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub items: Vec<WishlistItem>,
}

impl From<&Wishlist> for WishlistResponse {
    fn from(wishlist: &Wishlist) -> Self {
        Self {
            items: wishlist.items().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainsResponse {
    pub product_id: ProductId,
    pub in_wishlist: bool,
}

#[instrument(skip(session))]
async fn wishlist(session: Session) -> Result<Json<WishlistResponse>> {
    Ok(Json((&load_wishlist(&session).await?).into()))
}

/// Save a product; saving one twice is a conflict.
#[instrument(skip(session, item), fields(product_id = %item.product_id))]
async fn wishlist_add(
    session: Session,
    ApiJson(item): ApiJson<WishlistItem>,
) -> Result<impl IntoResponse> {
    let mut wishlist = load_wishlist(&session).await?;
    wishlist.add(item)?;
    save_wishlist(&session, &wishlist).await?;

    Ok((StatusCode::CREATED, Json(WishlistResponse::from(&wishlist))))
}

#[instrument(skip(session))]
async fn wishlist_contains(
    session: Session,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<ContainsResponse>> {
    let wishlist = load_wishlist(&session).await?;
    Ok(Json(ContainsResponse {
        product_id,
        in_wishlist: wishlist.contains(product_id),
    }))
}

#[instrument(skip(session))]
async fn wishlist_remove(
    session: Session,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<WishlistResponse>> {
    let mut wishlist = load_wishlist(&session).await?;
    if !wishlist.remove(product_id) {
        return Err(AppError::NotFound("Item not in wishlist".to_string()));
    }
    save_wishlist(&session, &wishlist).await?;

    Ok(Json((&wishlist).into()))
}

#[instrument(skip(session))]
async fn wishlist_clear(session: Session) -> Result<Json<WishlistResponse>> {
    let wishlist = Wishlist::default();
    save_wishlist(&session, &wishlist).await?;
    Ok(Json((&wishlist).into()))
}
