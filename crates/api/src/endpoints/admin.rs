//! Admin endpoints.

use axum::{Router, extract::State, routing::post};
use tracing::info;
use vitrine_common::AppResult;
use vitrine_core::RebuildReport;

use crate::{extractors::StaffUser, middleware::AppState, response::ApiResponse};

/// Recompute every counter from the edge tables.
async fn rebuild_counters(
    StaffUser(user): StaffUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<RebuildReport>> {
    info!(user_id = %user.id, "Counter rebuild requested");
    let report = state.counter_service.rebuild_all().await?;
    Ok(ApiResponse::ok(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/counters/rebuild", post(rebuild_counters))
}
