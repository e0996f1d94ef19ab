//! Derived counter maintenance.
//!
//! Counters are never adjusted by deltas. After every edge mutation the
//! affected counters are recomputed with an exact `COUNT` against the edge
//! table and the result overwrites the stored value, so a missed or failed
//! write is healed by the next mutation on the same entity or by
//! [`CounterService::rebuild_all`].

use serde::Serialize;
use tracing::{debug, info, warn};
use vitrine_common::{AppError, AppResult};
use vitrine_db::{
    entities::follow::FollowStatus,
    repositories::{
        BrandRepository, ContactRepository, FollowRepository, ProductLikeRepository,
        ProductRatingRepository, ProductRepository, UserRepository,
    },
};

use super::counter_store::{CounterName, CounterStoreService, EntityKind, counter_key};

/// Outcome of a full counter rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    pub users: u64,
    pub brands: u64,
    pub products: u64,
    pub keys_written: u64,
    pub failures: u64,
}

/// Keeps derived counters consistent with the edge tables.
#[derive(Clone)]
pub struct CounterService {
    store: CounterStoreService,
    follow_repo: FollowRepository,
    contact_repo: ContactRepository,
    like_repo: ProductLikeRepository,
    rating_repo: ProductRatingRepository,
    user_repo: UserRepository,
    brand_repo: BrandRepository,
    product_repo: ProductRepository,
    rebuild_batch_size: u64,
}

impl CounterService {
    /// Create a new counter service.
    #[must_use]
    pub fn new(
        store: CounterStoreService,
        follow_repo: FollowRepository,
        contact_repo: ContactRepository,
        like_repo: ProductLikeRepository,
        rating_repo: ProductRatingRepository,
        user_repo: UserRepository,
        brand_repo: BrandRepository,
        product_repo: ProductRepository,
    ) -> Self {
        Self {
            store,
            follow_repo,
            contact_repo,
            like_repo,
            rating_repo,
            user_repo,
            brand_repo,
            product_repo,
            rebuild_batch_size: 500,
        }
    }

    /// Set how many entities are loaded per page during a rebuild.
    #[must_use]
    pub fn with_rebuild_batch_size(mut self, batch_size: u64) -> Self {
        self.rebuild_batch_size = batch_size.max(1);
        self
    }

    /// Read a counter, defaulting to zero when missing or when the store fails.
    pub async fn get_counter(&self, kind: EntityKind, id: &str, name: CounterName) -> i64 {
        let key = counter_key(kind, id, name);
        match self.store.get(&key).await {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read counter, defaulting to 0");
                0
            }
        }
    }

    // === Graph mutation hooks ===

    /// A follow edge was created.
    pub async fn on_follow_created(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        status: FollowStatus,
    ) {
        if status == FollowStatus::Pending {
            debug!(
                from = %from_user_id,
                to = %to_user_id,
                "Pending follow created, counters unaffected"
            );
            return;
        }
        self.refresh_follow_pair(from_user_id, to_user_id).await;
    }

    /// A follow edge was deleted. `status` is the status the edge had.
    pub async fn on_follow_deleted(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        status: FollowStatus,
    ) {
        if status == FollowStatus::Pending {
            debug!(
                from = %from_user_id,
                to = %to_user_id,
                "Pending follow removed, counters unaffected"
            );
            return;
        }
        self.refresh_follow_pair(from_user_id, to_user_id).await;
    }

    /// A pending follow edge became accepted.
    pub async fn on_follow_accepted(&self, from_user_id: &str, to_user_id: &str) {
        self.refresh_follow_pair(from_user_id, to_user_id).await;
    }

    /// A user started following a brand.
    pub async fn on_contact_created(&self, user_id: &str, brand_id: &str) {
        self.refresh_contact_pair(user_id, brand_id).await;
    }

    /// A user stopped following a brand.
    pub async fn on_contact_deleted(&self, user_id: &str, brand_id: &str) {
        self.refresh_contact_pair(user_id, brand_id).await;
    }

    /// A like edge was created or deleted.
    pub async fn on_like_toggled(&self, user_id: &str, product_id: &str) {
        self.refresh(EntityKind::User, user_id, CounterName::LikeCount)
            .await;
        self.refresh(EntityKind::Product, product_id, CounterName::LikeCount)
            .await;
    }

    /// A rating edge was created or overwritten.
    pub async fn on_rating_set(&self, user_id: &str, product_id: &str, value: i16) {
        debug!(user_id = %user_id, product_id = %product_id, value, "Rating set");
        self.refresh(EntityKind::User, user_id, CounterName::RatingCount)
            .await;
        self.refresh(EntityKind::Product, product_id, CounterName::RatingCount)
            .await;
    }

    /// A product was deleted together with its like and rating edges.
    pub async fn on_product_deleted(&self, product_id: &str, likers: &[String], raters: &[String]) {
        for user_id in likers {
            self.refresh(EntityKind::User, user_id, CounterName::LikeCount)
                .await;
        }
        for user_id in raters {
            self.refresh(EntityKind::User, user_id, CounterName::RatingCount)
                .await;
        }
        self.refresh(EntityKind::Product, product_id, CounterName::LikeCount)
            .await;
        self.refresh(EntityKind::Product, product_id, CounterName::RatingCount)
            .await;
        debug!(
            product_id = %product_id,
            likers = likers.len(),
            raters = raters.len(),
            "Product engagement counters refreshed"
        );
    }

    async fn refresh_follow_pair(&self, from_user_id: &str, to_user_id: &str) {
        self.refresh(EntityKind::User, from_user_id, CounterName::FollowingsCountUser)
            .await;
        self.refresh(EntityKind::User, to_user_id, CounterName::FollowersCount)
            .await;
    }

    async fn refresh_contact_pair(&self, user_id: &str, brand_id: &str) {
        self.refresh(EntityKind::User, user_id, CounterName::FollowingsCountBrand)
            .await;
        self.refresh(EntityKind::Brand, brand_id, CounterName::FollowersCount)
            .await;
    }

    /// Recompute one counter, logging instead of failing.
    async fn refresh(&self, kind: EntityKind, id: &str, name: CounterName) -> bool {
        match self.recompute(kind, id, name).await {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    kind = %kind,
                    id = %id,
                    counter = %name,
                    error = %e,
                    "Failed to recompute counter, value left stale"
                );
                false
            }
        }
    }

    /// Count the edges behind a counter and overwrite the stored value.
    pub async fn recompute(&self, kind: EntityKind, id: &str, name: CounterName) -> AppResult<i64> {
        let count = self.count(kind, id, name).await? as i64;
        self.store.set(&counter_key(kind, id, name), count).await?;
        debug!(kind = %kind, id = %id, counter = %name, count, "Counter recomputed");
        Ok(count)
    }

    async fn count(&self, kind: EntityKind, id: &str, name: CounterName) -> AppResult<u64> {
        match (kind, name) {
            (EntityKind::User, CounterName::FollowersCount) => {
                self.follow_repo.count_followers(id).await
            }
            (EntityKind::User, CounterName::FollowingsCountUser) => {
                self.follow_repo.count_followings(id).await
            }
            (EntityKind::User, CounterName::FollowingsCountBrand) => {
                self.contact_repo.count_followings(id).await
            }
            (EntityKind::User, CounterName::LikeCount) => self.like_repo.count_by_user(id).await,
            (EntityKind::User, CounterName::RatingCount) => {
                self.rating_repo.count_by_user(id).await
            }
            (EntityKind::Brand, CounterName::FollowersCount) => {
                self.contact_repo.count_followers(id).await
            }
            (EntityKind::Product, CounterName::LikeCount) => {
                self.like_repo.count_by_product(id).await
            }
            (EntityKind::Product, CounterName::RatingCount) => {
                self.rating_repo.count_by_product(id).await
            }
            _ => Err(AppError::Internal(format!(
                "{kind} has no {name} counter"
            ))),
        }
    }

    // === Rebuild ===

    /// Recompute every counter of every entity from the edge tables.
    ///
    /// Uses exactly the same recompute path as the mutation hooks. Failures on
    /// individual counters are counted and logged; failing to page through an
    /// entity table aborts the rebuild.
    pub async fn rebuild_all(&self) -> AppResult<RebuildReport> {
        info!(batch_size = self.rebuild_batch_size, "Rebuilding all counters");
        let mut report = RebuildReport::default();

        let mut after: Option<String> = None;
        loop {
            let page = self
                .user_repo
                .find_page_after(after.as_deref(), self.rebuild_batch_size)
                .await?;
            let Some(last) = page.last() else { break };
            after = Some(last.id.clone());
            for user in &page {
                self.rebuild_entity(EntityKind::User, &user.id, &mut report)
                    .await;
                report.users += 1;
            }
        }

        let mut after: Option<String> = None;
        loop {
            let page = self
                .brand_repo
                .find_page_after(after.as_deref(), self.rebuild_batch_size)
                .await?;
            let Some(last) = page.last() else { break };
            after = Some(last.id.clone());
            for brand in &page {
                self.rebuild_entity(EntityKind::Brand, &brand.id, &mut report)
                    .await;
                report.brands += 1;
            }
        }

        let mut after: Option<String> = None;
        loop {
            let page = self
                .product_repo
                .find_page_after(after.as_deref(), self.rebuild_batch_size)
                .await?;
            let Some(last) = page.last() else { break };
            after = Some(last.id.clone());
            for product in &page {
                self.rebuild_entity(EntityKind::Product, &product.id, &mut report)
                    .await;
                report.products += 1;
            }
        }

        info!(
            users = report.users,
            brands = report.brands,
            products = report.products,
            keys_written = report.keys_written,
            failures = report.failures,
            "Counter rebuild finished"
        );

        Ok(report)
    }

    async fn rebuild_entity(&self, kind: EntityKind, id: &str, report: &mut RebuildReport) {
        for &name in CounterName::for_kind(kind) {
            if self.refresh(kind, id, name).await {
                report.keys_written += 1;
            } else {
                report.failures += 1;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::counter_store::{CounterStore, MemoryCounterStore};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection, store: Arc<MemoryCounterStore>) -> CounterService {
        let db = Arc::new(db);
        CounterService::new(
            store,
            FollowRepository::new(db.clone()),
            ContactRepository::new(db.clone()),
            ProductLikeRepository::new(db.clone()),
            ProductRatingRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            BrandRepository::new(db.clone()),
            ProductRepository::new(db),
        )
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }
    }

    #[tokio::test]
    async fn test_follow_created_overwrites_both_endpoints() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(2)], [count_row(9)]])
            .into_connection();
        let store = Arc::new(MemoryCounterStore::new());
        store.set("user:b:followers_count", 100).await.unwrap();

        let counters = service(db, store.clone());
        counters
            .on_follow_created("a", "b", FollowStatus::Accepted)
            .await;

        assert_eq!(store.peek("user:a:followings_count_user").await, Some(2));
        assert_eq!(store.peek("user:b:followers_count").await, Some(9));
    }

    #[tokio::test]
    async fn test_pending_follow_skips_recompute() {
        // No query results queued: any COUNT would fail the mock.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let store = Arc::new(MemoryCounterStore::new());

        let counters = service(db, store.clone());
        counters
            .on_follow_created("a", "b", FollowStatus::Pending)
            .await;

        assert!(store.counter_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_not_propagated() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)], [count_row(1)]])
            .into_connection();
        let store = Arc::new(MemoryCounterStore::new());
        store.set_failing(true);

        let counters = service(db, store.clone());
        counters.on_contact_created("a", "brand1").await;

        store.set_failing(false);
        assert!(store.counter_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_counter_defaults_to_zero() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let store = Arc::new(MemoryCounterStore::new());
        let counters = service(db, store.clone());

        assert_eq!(
            counters
                .get_counter(EntityKind::Product, "p1", CounterName::LikeCount)
                .await,
            0
        );

        store.set("product:p1:like_count", 3).await.unwrap();
        store.set_failing(true);
        assert_eq!(
            counters
                .get_counter(EntityKind::Product, "p1", CounterName::LikeCount)
                .await,
            0
        );
    }

    #[tokio::test]
    async fn test_recompute_rejects_unknown_counter() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let counters = service(db, Arc::new(MemoryCounterStore::new()));

        let result = counters
            .recompute(EntityKind::Product, "p1", CounterName::FollowersCount)
            .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
