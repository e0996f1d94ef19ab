//! API endpoints.

mod admin;
mod brands;
mod feed;
mod following;
mod products;
mod users;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/following", following::router())
        .nest("/brands", brands::router())
        .nest("/products", products::router())
        .nest("/i", feed::router())
        .nest("/admin", admin::router())
}

/// Id-cursor pagination shared by list endpoints.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

impl PageQuery {
    /// Requested limit, capped at 100.
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, 100)
    }
}

const fn default_limit() -> u64 {
    10
}
