//! Invoice route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use bosco_core::{Invoice, InvoiceId, InvoiceRecipient, OrderId};

use crate::db::{InvoiceRepository, OrderRepository, UserRepository};
use crate::error::{ApiJson, ApiQuery, AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the invoice router.
pub fn router() -> Router<AppState> {
    Router::new().route("/invoice", get(show).post(create))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    pub invoice_id: Option<InvoiceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub order_id: OrderId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub invoice: Invoice,
    /// Read from the order at fetch time, not part of the snapshot.
    pub settled_by_paystack: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCreatedResponse {
    pub success: bool,
    pub invoice_id: InvoiceId,
}

/// Load an invoice by id, or 400/404.
pub(crate) async fn find_invoice(state: &AppState, invoice_id: Option<InvoiceId>) -> Result<Invoice> {
    let invoice_id =
        invoice_id.ok_or_else(|| AppError::BadRequest("invoiceId is required".to_string()))?;

    InvoiceRepository::new(state.pool())
        .get(invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Invoice not found".to_string()))
}

/// An invoice plus whether its order has since been paid.
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<InvoiceQuery>,
) -> Result<Json<InvoiceResponse>> {
    let invoice = find_invoice(&state, query.invoice_id).await?;

    let settled_by_paystack = OrderRepository::new(state.pool())
        .get(invoice.order_id)
        .await?
        .is_some_and(|order| order.settled_by_paystack);

    Ok(Json(InvoiceResponse {
        invoice,
        settled_by_paystack,
    }))
}

/// Issue an invoice for a priced order.
///
/// Every call issues a new invoice; earlier ones are left untouched.
#[instrument(skip(state, admin, request), fields(admin_id = %admin.id, order_id = %request.order_id))]
async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateInvoiceRequest>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .get(request.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let customer = match order.user_id {
        Some(user_id) => UserRepository::new(state.pool()).get_by_id(user_id).await?,
        None => None,
    };
    let recipient = InvoiceRecipient::for_customer(
        customer
            .as_ref()
            .map(|user| (user.username.as_str(), user.email.as_str())),
    );

    let invoice = Invoice::snapshot(&order, recipient, Utc::now())?;
    InvoiceRepository::new(state.pool()).create(&invoice).await?;

    info!(invoice_id = %invoice.id, total_price = %invoice.total_price, "Invoice issued");

    Ok((
        StatusCode::CREATED,
        Json(InvoiceCreatedResponse {
            success: true,
            invoice_id: invoice.id,
        }),
    ))
}
