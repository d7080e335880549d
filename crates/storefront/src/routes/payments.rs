//! Payment handoff route handlers.
//!
//! The browser pays through the Paystack inline widget using the parameters
//! from `/payments/checkout`; settlement arrives via the signed webhook.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use bosco_core::{Email, InvoiceId, OrderId, OrderStatus, PaymentState};

use crate::db::{OrderRepository, RepositoryError};
use crate::error::{ApiQuery, AppError, Result};
use crate::middleware::OptionalAuth;
use crate::routes::invoices::find_invoice;
use crate::services::payments::{
    CheckoutParams, PaymentError, SIGNATURE_HEADER, WebhookEvent, verify_signature,
};
use crate::state::AppState;

/// Build the payment router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments/checkout", get(checkout))
        .route("/payments/webhook", post(webhook))
        .route("/ref-verify", get(verify))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuery {
    pub invoice_id: Option<InvoiceId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyQuery {
    pub order_id: Option<OrderId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub order_id: OrderId,
    pub settled_by_paystack: bool,
    pub status: PaymentState,
    pub order_status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Widget parameters for paying an invoice.
///
/// Bills the email on the invoice, falling back to the signed-in customer
/// for invoices issued without one.
#[instrument(skip(state, user))]
async fn checkout(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    ApiQuery(query): ApiQuery<CheckoutQuery>,
) -> Result<Json<CheckoutParams>> {
    let invoice = find_invoice(&state, query.invoice_id).await?;

    let email = Email::parse(&invoice.email)
        .ok()
        .or_else(|| user.map(|u| u.email))
        .ok_or_else(|| AppError::BadRequest("No email to bill this invoice to".to_string()))?;

    let params = CheckoutParams::for_invoice(state.config(), &invoice, email)?;

    info!(invoice_id = %invoice.id, order_id = %invoice.order_id, amount = params.amount, "Payment handoff");

    Ok(Json(params))
}

/// Whether an order has been paid. Reads the flag only.
#[instrument(skip(state))]
async fn verify(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VerifyQuery>,
) -> Result<Json<VerifyResponse>> {
    let order_id = query
        .order_id
        .ok_or_else(|| AppError::BadRequest("orderId is required".to_string()))?;

    let order = OrderRepository::new(state.pool())
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(VerifyResponse {
        order_id,
        settled_by_paystack: order.settled_by_paystack,
        status: order.payment_state(),
        order_status: order.status,
    }))
}

/// Paystack webhook.
///
/// The signature is checked against the raw body before anything is parsed.
/// Only `charge.success` changes state; other events are acknowledged.
#[instrument(skip(state, headers, body))]
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PaymentError::InvalidSignature("Missing signature header".to_string()))?;

    verify_signature(&state.config().paystack.secret_key, &body, signature)?;

    let event = WebhookEvent::parse(&body)?;

    let Some((order_id, reference)) = event.settled_order() else {
        info!(event = %event.event, charge_status = ?event.data.status, "Ignoring Paystack event");
        return Ok(Json(WebhookAck { received: true }));
    };

    let newly_settled = OrderRepository::new(state.pool())
        .mark_settled(order_id, reference)
        .await
        .inspect_err(|e| {
            if matches!(e, RepositoryError::NotFound) {
                warn!(%order_id, "Paystack charge for unknown order");
            }
        })?;

    if newly_settled {
        info!(%order_id, "Order settled by Paystack");
    } else {
        info!(%order_id, "Duplicate Paystack settlement ignored");
    }

    Ok(Json(WebhookAck { received: true }))
}
