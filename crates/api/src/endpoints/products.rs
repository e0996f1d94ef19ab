//! Product endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vitrine_common::AppResult;
use vitrine_core::{CreateProductInput, EntityKind, LikeToggle, PRODUCT_VIEWS, RatingChange};

use crate::{
    extractors::{AuthUser, NetworkInfo},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

const PRODUCT_FIELDS: &[&str] = &[
    "id",
    "brand_id",
    "name",
    "slug",
    "price",
    "is_sale",
    "created_at",
    PRODUCT_VIEWS,
    "like_count",
    "rating_count",
];

/// Create product request.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub brand_id: String,
    #[serde(flatten)]
    pub product: CreateProductInput,
}

/// Publish a product.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> AppResult<ApiResponse<Value>> {
    let product = state
        .product_service
        .create_product(&user.id, &req.brand_id, req.product)
        .await?;

    let body = state
        .aggregates
        .represent(EntityKind::Product, &product.id, &product, PRODUCT_FIELDS)
        .await?;
    Ok(ApiResponse::ok(body))
}

/// Show a product and record the visitor.
async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    NetworkInfo(network): NetworkInfo,
) -> AppResult<ApiResponse<Value>> {
    let product = state.product_service.get(&product_id).await?;

    state
        .view_tracker
        .record_detail_view(EntityKind::Product, &product.id, &network)
        .await;

    let body = state
        .aggregates
        .represent(EntityKind::Product, &product.id, &product, PRODUCT_FIELDS)
        .await?;
    Ok(ApiResponse::ok(body))
}

/// Delete a product.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state
        .product_service
        .delete_product(&user.id, &product_id)
        .await?;
    Ok(no_content())
}

/// Like toggle response.
#[derive(Serialize)]
pub struct LikeResponse {
    pub liked: bool,
}

/// Like or unlike a product.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<ApiResponse<LikeResponse>> {
    let toggle = state
        .engagement_service
        .toggle_like(&user.id, &product_id)
        .await?;

    Ok(ApiResponse::ok(LikeResponse {
        liked: toggle == LikeToggle::Liked,
    }))
}

/// Rating request.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub value: i16,
}

/// Rating response.
#[derive(Serialize)]
pub struct RatingResponse {
    pub status: &'static str,
}

/// Rate a product, replacing any earlier rating by the caller.
async fn rate(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(req): Json<RatingRequest>,
) -> AppResult<ApiResponse<RatingResponse>> {
    let change = state
        .engagement_service
        .set_rating(&user.id, &product_id, req.value)
        .await?;

    let status = match change {
        RatingChange::Created => "created",
        RatingChange::Updated => "updated",
    };
    Ok(ApiResponse::ok(RatingResponse { status }))
}

/// Sale toggle request.
#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    pub is_sale: bool,
}

/// Put a product on sale or take it off.
async fn sale(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(req): Json<SaleRequest>,
) -> AppResult<ApiResponse<Value>> {
    let product = state
        .product_service
        .set_sale(&user.id, &product_id, req.is_sale)
        .await?;

    let body = state
        .aggregates
        .represent(EntityKind::Product, &product.id, &product, PRODUCT_FIELDS)
        .await?;
    Ok(ApiResponse::ok(body))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(show).delete(delete))
        .route("/{id}/like", post(like))
        .route("/{id}/rating", post(rate))
        .route("/{id}/sale", post(sale))
}
