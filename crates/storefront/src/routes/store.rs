//! Catalog route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use bosco_core::{NewProduct, Product, ProductId, ProductTag};

use crate::db::ProductFilter;
use crate::error::{ApiJson, ApiPath, ApiQuery, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/store", get(list).post(create))
        .route("/store/{id}", get(show).patch(set_featured))
}

/// Query parameters for the catalog listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub tag: Option<ProductTag>,
    pub featured: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedUpdate {
    pub featured: bool,
}

/// List the catalog, newest first.
#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ProductListResponse>> {
    let filter = ProductFilter {
        tag: query.tag,
        featured: query.featured,
    };
    let products = state.catalog().list(state.pool(), filter).await?;

    Ok(Json(ProductListResponse {
        products: products.as_ref().clone(),
    }))
}

/// Product detail.
#[instrument(skip(state))]
async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductResponse>> {
    let product = state.catalog().get(state.pool(), id).await?;

    Ok(Json(ProductResponse {
        product: product.as_ref().clone(),
    }))
}

/// List a new product.
#[instrument(skip(state, admin, new_product), fields(admin_id = %admin.id))]
async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(new_product): ApiJson<NewProduct>,
) -> Result<impl IntoResponse> {
    let new_product = new_product.validate()?;
    let product = state.catalog().create(state.pool(), new_product).await?;

    info!(product_id = %product.id, tag = %product.tag, "Product listed");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            id: product.id,
        }),
    ))
}

/// Feature or unfeature a product.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn set_featured(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(update): ApiJson<FeaturedUpdate>,
) -> Result<Json<serde_json::Value>> {
    state
        .catalog()
        .set_featured(state.pool(), id, update.featured)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "id": id,
        "featured": update.featured,
    })))
}
