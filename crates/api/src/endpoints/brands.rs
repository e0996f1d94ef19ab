//! Brand endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde_json::Value;
use vitrine_common::AppResult;
use vitrine_core::EntityKind;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

const BRAND_FIELDS: &[&str] = &["id", "owner_id", "name", "slug", "created_at", "followers_count"];

/// Show a brand.
async fn show(
    State(state): State<AppState>,
    Path(brand_id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    let brand = state.brand_service.get(&brand_id).await?;
    let body = state
        .aggregates
        .represent(EntityKind::Brand, &brand.id, &brand, BRAND_FIELDS)
        .await?;
    Ok(ApiResponse::ok(body))
}

/// Follow a brand.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(brand_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .brand_follow_service
        .follow_brand(&user.id, &brand_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Unfollow a brand.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(brand_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state
        .brand_follow_service
        .unfollow_brand(&user.id, &brand_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(show))
        .route("/{id}/follow", post(follow))
        .route("/{id}/unfollow", post(unfollow))
}
