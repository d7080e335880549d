//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (database)
//!
//! # Catalog (under /api/v1)
//! GET   /store                         - Product listing (?tag=&featured=)
//! POST  /store                         - List a product (admin)
//! GET   /store/{id}                    - Product detail
//! PATCH /store/{id}                    - Feature/unfeature (admin)
//!
//! # Cart & wishlist (session)
//! GET|DELETE /cart                     - View / clear cart
//! POST  /cart/items                    - Add item
//! POST  /cart/items/update             - Set quantity (0 removes)
//! POST  /cart/items/remove             - Remove line
//! GET|POST|DELETE /wishlist            - View / add / clear
//! GET|DELETE /wishlist/{productId}     - Contains / remove
//!
//! # Orders
//! POST  /orders                        - Place order
//! POST  /checkout                      - Place order from session cart
//! GET   /orders                        - One order or a page (admin)
//! PATCH /orders?orderId=               - Set status (admin)
//! POST  /orders/shipping-fee           - Quote shipping (admin)
//! GET   /getorder?userId=&status=      - A customer's orders
//!
//! # Invoices & payment
//! GET   /invoice?invoiceId=            - Invoice with settlement flag
//! POST  /invoice                       - Issue invoice (admin)
//! GET   /payments/checkout?invoiceId=  - Paystack widget parameters
//! POST  /payments/webhook              - Paystack webhook (signed)
//! GET   /ref-verify?orderId=           - Payment status
//!
//! # Accounts
//! POST  /users                         - signup | login | logout
//! GET|PATCH /users/me                  - Own profile
//! GET   /customers                     - All customers (admin)
//!
//! # Stats
//! POST  /stats                         - Count a product view
//! GET   /stats/orders                  - Order counters (admin)
//! GET   /stats/products/{id}           - Product views (admin)
//! ```

pub mod cart;
pub mod invoices;
pub mod orders;
pub mod payments;
pub mod stats;
pub mod store;
pub mod users;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Prefix for every JSON endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Create all API routes for the storefront.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(store::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(invoices::router())
        .merge(payments::router())
        .merge(users::router())
        .merge(stats::router())
}

/// Create all routes for the storefront, health checks included.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest(API_PREFIX, api_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
