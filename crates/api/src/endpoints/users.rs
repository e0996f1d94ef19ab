//! User profile endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde_json::Value;
use vitrine_common::AppResult;
use vitrine_core::{ACCOUNT_VIEWS, EntityKind};

use super::PageQuery;
use crate::{extractors::NetworkInfo, middleware::AppState, response::ApiResponse};

/// Fields of a full profile.
const PROFILE_FIELDS: &[&str] = &[
    "id",
    "username",
    "name",
    "is_private",
    "created_at",
    "followers_count",
    "followings_count_user",
    "followings_count_brand",
    ACCOUNT_VIEWS,
];

/// Fields of a compact user card in follower lists.
const CARD_FIELDS: &[&str] = &["id", "username", "name", "followers_count"];

/// Show a profile and record the visitor.
async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    NetworkInfo(network): NetworkInfo,
) -> AppResult<ApiResponse<Value>> {
    let user = state.user_service.get(&user_id).await?;

    state
        .view_tracker
        .record_detail_view(EntityKind::User, &user.id, &network)
        .await;

    let profile = state
        .aggregates
        .represent(EntityKind::User, &user.id, &user, PROFILE_FIELDS)
        .await?;

    Ok(ApiResponse::ok(profile))
}

async fn cards(state: &AppState, user_ids: Vec<String>) -> AppResult<Vec<Value>> {
    let users = state.user_service.get_many(&user_ids).await?;

    let mut cards = Vec::with_capacity(users.len());
    for user in &users {
        cards.push(
            state
                .aggregates
                .represent(EntityKind::User, &user.id, user, CARD_FIELDS)
                .await?,
        );
    }
    Ok(cards)
}

/// Accepted followers of a user.
async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<Value>>> {
    let edges = state
        .following_service
        .get_followers(&user_id, page.limit(), page.until_id.as_deref())
        .await?;

    let ids = edges.into_iter().map(|edge| edge.from_user_id).collect();
    Ok(ApiResponse::ok(cards(&state, ids).await?))
}

/// Users a user follows.
async fn followings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<Value>>> {
    let edges = state
        .following_service
        .get_followings(&user_id, page.limit(), page.until_id.as_deref())
        .await?;

    let ids = edges.into_iter().map(|edge| edge.to_user_id).collect();
    Ok(ApiResponse::ok(cards(&state, ids).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(show))
        .route("/{id}/followers", get(followers))
        .route("/{id}/followings", get(followings))
}
