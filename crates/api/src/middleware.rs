//! Application state and request middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;
use tracing::debug;
use vitrine_common::config::{CounterConfig, FeedConfig, ViewConfig};
use vitrine_core::{
    ActionFeedService, AggregateReader, BrandFollowService, BrandService, CounterService,
    CounterStoreService, FollowingService, ProductEngagementService, ProductService, UserService,
    ViewTracker,
};
use vitrine_db::repositories::{
    ActionRepository, BrandRepository, ContactRepository, FollowRepository, ProductLikeRepository,
    ProductRatingRepository, ProductRepository, UserRepository,
};

/// Header carrying the authenticated user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub brand_service: BrandService,
    pub product_service: ProductService,
    pub following_service: FollowingService,
    pub brand_follow_service: BrandFollowService,
    pub engagement_service: ProductEngagementService,
    pub feed_service: ActionFeedService,
    pub counter_service: CounterService,
    pub view_tracker: ViewTracker,
    pub aggregates: AggregateReader,
}

impl AppState {
    /// Wire every service over one database pool and one counter store.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        store: CounterStoreService,
        counters: &CounterConfig,
        views: &ViewConfig,
        feed: &FeedConfig,
    ) -> Self {
        let user_repo = UserRepository::new(db.clone());
        let brand_repo = BrandRepository::new(db.clone());
        let product_repo = ProductRepository::new(db.clone());
        let follow_repo = FollowRepository::new(db.clone());
        let contact_repo = ContactRepository::new(db.clone());
        let like_repo = ProductLikeRepository::new(db.clone());
        let rating_repo = ProductRatingRepository::new(db.clone());
        let action_repo = ActionRepository::new(db);

        let counter_service = CounterService::new(
            store.clone(),
            follow_repo.clone(),
            contact_repo.clone(),
            like_repo.clone(),
            rating_repo.clone(),
            user_repo.clone(),
            brand_repo.clone(),
            product_repo.clone(),
        )
        .with_rebuild_batch_size(counters.rebuild_batch_size);

        let view_tracker = ViewTracker::new(store).with_retention(views.retention());
        let feed_service = ActionFeedService::with_config(action_repo, feed);

        Self {
            user_service: UserService::new(user_repo.clone()),
            brand_service: BrandService::new(brand_repo.clone()),
            product_service: ProductService::new(
                product_repo.clone(),
                brand_repo.clone(),
                like_repo.clone(),
                rating_repo.clone(),
                feed_service.clone(),
                counter_service.clone(),
            ),
            following_service: FollowingService::new(
                follow_repo,
                user_repo,
                counter_service.clone(),
            ),
            brand_follow_service: BrandFollowService::new(
                contact_repo,
                brand_repo,
                counter_service.clone(),
            ),
            engagement_service: ProductEngagementService::new(
                like_repo,
                rating_repo,
                product_repo,
                counter_service.clone(),
            ),
            aggregates: AggregateReader::new(counter_service.clone(), view_tracker.clone()),
            feed_service,
            counter_service,
            view_tracker,
        }
    }
}

/// Authentication middleware.
///
/// Resolves `X-User-Id` to an active user and stores it in the request
/// extensions. Unknown ids are left unauthenticated.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if let Some(user_id) = user_id {
        match state.user_service.get(&user_id).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => debug!(user_id = %user_id, error = %e, "Ignoring unknown user id"),
        }
    }

    next.run(req).await
}
