//! Following endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use vitrine_common::AppResult;
use vitrine_core::FollowResult;
use vitrine_db::entities::follow;

use super::PageQuery;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Request naming the other user of a follow edge.
#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub user_id: String,
}

/// Follow result response.
#[derive(Serialize)]
pub struct FollowResponse {
    pub status: &'static str,
}

/// Follow a user.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let result = state.following_service.follow(&user.id, &req.user_id).await?;

    let status = match result {
        FollowResult::Following => "following",
        FollowResult::Pending => "pending",
    };
    Ok(ApiResponse::ok(FollowResponse { status }))
}

/// Unfollow a user, or withdraw a pending request.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .following_service
        .unfollow(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Accept a follow request sent to the caller.
async fn accept(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .following_service
        .accept_request(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Reject a follow request sent to the caller.
async fn reject(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .following_service
        .reject_request(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Pending follow request item.
#[derive(Serialize)]
pub struct FollowRequestItemResponse {
    pub id: String,
    pub from_user_id: String,
    pub created_at: String,
}

impl From<follow::Model> for FollowRequestItemResponse {
    fn from(f: follow::Model) -> Self {
        Self {
            id: f.id,
            from_user_id: f.from_user_id,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// List follow requests received by the caller.
async fn list_pending(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<FollowRequestItemResponse>>> {
    let requests = state
        .following_service
        .get_pending_requests(&user.id, page.limit(), page.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(follow))
        .route("/delete", post(unfollow))
        .route("/requests", get(list_pending))
        .route("/requests/accept", post(accept))
        .route("/requests/reject", post(reject))
}
