//! HTTP API layer for vitrine.
//!
//! The handlers here are the edge-mutation and detail-read collaborators of
//! the counter-and-feed subsystem:
//!
//! - **Endpoints**: users, following, brands, products, feed, admin
//! - **Extractors**: authenticated user, visitor network info
//! - **Middleware**: `X-User-Id` resolution
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
