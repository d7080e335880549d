//! Product view and order statistics.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bosco_core::{ANONYMOUS_VIEWER, OrderStats, ProductId, UserId, ViewCounts};

use crate::db::StatsRepository;
use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::{OptionalAuth, RequireAdmin, public_write_rate_limiter};
use crate::state::AppState;

/// Build the statistics router.
pub fn router() -> Router<AppState> {
    let views = Router::new()
        .route("/stats", post(record_view))
        .layer(public_write_rate_limiter());

    Router::new()
        .route("/stats/orders", get(order_stats))
        .route("/stats/products/{id}", get(product_views))
        .merge(views)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct Recorded {
    pub success: bool,
}

/// Count a product page view.
///
/// The viewer is the submitted user id, else the signed-in customer, else
/// anonymous.
#[instrument(skip(state, user, request), fields(product_id = %request.product_id))]
async fn record_view(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    ApiJson(request): ApiJson<ViewRequest>,
) -> Result<Json<Recorded>> {
    let viewer = request
        .user_id
        .or_else(|| user.map(|u| u.id))
        .map_or_else(|| ANONYMOUS_VIEWER.to_string(), |id| id.to_string());

    StatsRepository::new(state.pool())
        .record_view(request.product_id, &viewer, Utc::now().date_naive())
        .await?;

    Ok(Json(Recorded { success: true }))
}

/// Views of one product today, this month and this year.
#[instrument(skip(state, _admin))]
async fn product_views(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ViewCounts>> {
    let counts = StatsRepository::new(state.pool())
        .product_views(id, Utc::now().date_naive())
        .await?;
    Ok(Json(counts))
}

/// Total and same-day order counts.
#[instrument(skip(state, _admin))]
async fn order_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<OrderStats>> {
    let stats = StatsRepository::new(state.pool())
        .order_stats(Utc::now().date_naive())
        .await?;
    Ok(Json(stats))
}
