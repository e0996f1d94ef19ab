//! Shared fixtures for core integration tests.
//!
//! Every harness owns a private in-memory `SQLite` database whose schema is
//! generated from the entities, and an in-memory counter store.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use vitrine_core::{
    ActionFeedService, AggregateReader, BrandFollowService, BrandService, CounterService,
    FollowingService, MemoryCounterStore, ProductEngagementService, ProductService, UserService,
    ViewTracker,
};
use vitrine_db::{
    entities::{brand, product, user},
    repositories::{
        ActionRepository, BrandRepository, ContactRepository, FollowRepository,
        ProductLikeRepository, ProductRatingRepository, ProductRepository, UserRepository,
    },
    test_utils::memory_database,
};

pub struct Harness {
    pub db: Arc<DatabaseConnection>,
    pub store: Arc<MemoryCounterStore>,
    pub counters: CounterService,
    pub following: FollowingService,
    pub brand_follow: BrandFollowService,
    pub engagement: ProductEngagementService,
    pub products: ProductService,
    pub feed: ActionFeedService,
    pub views: ViewTracker,
    pub aggregates: AggregateReader,
    pub users: UserService,
    pub brands: BrandService,
    pub follow_repo: FollowRepository,
    pub contact_repo: ContactRepository,
    pub action_repo: ActionRepository,
}

/// Counter service over `db` writing into `store`.
pub fn counter_service(
    db: &Arc<DatabaseConnection>,
    store: Arc<MemoryCounterStore>,
) -> CounterService {
    CounterService::new(
        store,
        FollowRepository::new(db.clone()),
        ContactRepository::new(db.clone()),
        ProductLikeRepository::new(db.clone()),
        ProductRatingRepository::new(db.clone()),
        UserRepository::new(db.clone()),
        BrandRepository::new(db.clone()),
        ProductRepository::new(db.clone()),
    )
}

impl Harness {
    pub async fn new() -> Self {
        let db = Arc::new(memory_database().await.expect("in-memory database"));
        let store = Arc::new(MemoryCounterStore::new());

        let counters = counter_service(&db, store.clone());
        let views = ViewTracker::new(store.clone());
        let feed = ActionFeedService::new(ActionRepository::new(db.clone()));

        Self {
            following: FollowingService::new(
                FollowRepository::new(db.clone()),
                UserRepository::new(db.clone()),
                counters.clone(),
            ),
            brand_follow: BrandFollowService::new(
                ContactRepository::new(db.clone()),
                BrandRepository::new(db.clone()),
                counters.clone(),
            ),
            engagement: ProductEngagementService::new(
                ProductLikeRepository::new(db.clone()),
                ProductRatingRepository::new(db.clone()),
                ProductRepository::new(db.clone()),
                counters.clone(),
            ),
            products: ProductService::new(
                ProductRepository::new(db.clone()),
                BrandRepository::new(db.clone()),
                ProductLikeRepository::new(db.clone()),
                ProductRatingRepository::new(db.clone()),
                feed.clone(),
                counters.clone(),
            ),
            aggregates: AggregateReader::new(counters.clone(), views.clone()),
            users: UserService::new(UserRepository::new(db.clone())),
            brands: BrandService::new(BrandRepository::new(db.clone())),
            follow_repo: FollowRepository::new(db.clone()),
            contact_repo: ContactRepository::new(db.clone()),
            action_repo: ActionRepository::new(db.clone()),
            counters,
            feed,
            views,
            store,
            db,
        }
    }

    pub async fn create_user(&self, id: &str, is_private: bool) -> user::Model {
        UserRepository::new(self.db.clone())
            .create(user::ActiveModel {
                id: Set(id.to_string()),
                username: Set(format!("user_{id}")),
                name: Set(None),
                is_private: Set(is_private),
                is_active: Set(true),
                is_staff: Set(false),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap()
    }

    pub async fn create_brand(&self, id: &str, owner_id: &str) -> brand::Model {
        BrandRepository::new(self.db.clone())
            .create(brand::ActiveModel {
                id: Set(id.to_string()),
                owner_id: Set(Some(owner_id.to_string())),
                name: Set(format!("Brand {id}")),
                slug: Set(format!("brand-{id}")),
                is_active: Set(true),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap()
    }

    pub async fn create_product(&self, id: &str, brand_id: &str) -> product::Model {
        ProductRepository::new(self.db.clone())
            .create(product::ActiveModel {
                id: Set(id.to_string()),
                brand_id: Set(brand_id.to_string()),
                name: Set(format!("Product {id}")),
                slug: Set(format!("product-{id}")),
                price: Set(1_000),
                is_sale: Set(false),
                is_active: Set(true),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap()
    }

    /// Stored counter value, zero when never written.
    pub async fn counter(&self, key: &str) -> i64 {
        self.store.peek(key).await.unwrap_or(0)
    }
}
