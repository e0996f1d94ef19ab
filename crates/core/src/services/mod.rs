//! Business logic services.

#![allow(missing_docs)]

pub mod actions;
pub mod aggregates;
pub mod brand;
pub mod brand_follow;
pub mod counter_store;
pub mod counters;
pub mod engagement;
pub mod following;
pub mod product;
pub mod redis_store;
pub mod user;
pub mod views;

pub use actions::{
    ActionFeedService, ActionTarget, FeedEntry, RecordOutcome, ResolveMode, ResolveOutcome,
};
pub use aggregates::{ACCOUNT_VIEWS, AggregateReader, DerivedField, PRODUCT_VIEWS, derived_fields};
pub use brand::BrandService;
pub use brand_follow::BrandFollowService;
pub use counter_store::{
    CounterName, CounterStore, CounterStoreService, EntityKind, MemoryCounterStore, counter_key,
    views_key,
};
pub use counters::{CounterService, RebuildReport};
pub use engagement::{LikeToggle, ProductEngagementService, RatingChange};
pub use following::{FollowResult, FollowingService};
pub use product::{CreateProductInput, ProductService};
pub use redis_store::RedisCounterStore;
pub use user::UserService;
pub use views::{RequestNetworkInfo, ViewTracker};
