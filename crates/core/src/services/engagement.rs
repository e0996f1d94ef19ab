//! Product likes and ratings.

use crate::services::counters::CounterService;
use chrono::Utc;
use sea_orm::Set;
use tracing::info;
use vitrine_common::{AppError, AppResult, IdGenerator};
use vitrine_db::{
    entities::{
        product_like,
        product_rating::{self, MAX_RATING, MIN_RATING},
    },
    repositories::{ProductLikeRepository, ProductRatingRepository, ProductRepository},
};

/// Result of [`ProductEngagementService::toggle_like`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeToggle {
    Liked,
    Unliked,
}

/// Result of [`ProductEngagementService::set_rating`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingChange {
    Created,
    Updated,
}

/// Like and rating edges between users and products.
#[derive(Clone)]
pub struct ProductEngagementService {
    like_repo: ProductLikeRepository,
    rating_repo: ProductRatingRepository,
    product_repo: ProductRepository,
    counters: CounterService,
    id_gen: IdGenerator,
}

impl ProductEngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub const fn new(
        like_repo: ProductLikeRepository,
        rating_repo: ProductRatingRepository,
        product_repo: ProductRepository,
        counters: CounterService,
    ) -> Self {
        Self {
            like_repo,
            rating_repo,
            product_repo,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a product, or remove an existing like.
    pub async fn toggle_like(&self, user_id: &str, product_id: &str) -> AppResult<LikeToggle> {
        self.product_repo.get_active_by_id(product_id).await?;

        let result = match self.like_repo.find_by_pair(user_id, product_id).await? {
            Some(like) => {
                self.like_repo.delete(&like.id).await?;
                LikeToggle::Unliked
            }
            None => {
                let model = product_like::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    product_id: Set(product_id.to_string()),
                    created_at: Set(Utc::now().into()),
                };
                self.like_repo.create(model).await?;
                LikeToggle::Liked
            }
        };

        self.counters.on_like_toggled(user_id, product_id).await;

        info!(user_id = %user_id, product_id = %product_id, result = ?result, "Like toggled");
        Ok(result)
    }

    /// Rate a product, overwriting any previous rating by the same user.
    pub async fn set_rating(
        &self,
        user_id: &str,
        product_id: &str,
        value: i16,
    ) -> AppResult<RatingChange> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(AppError::Validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }

        self.product_repo.get_active_by_id(product_id).await?;

        let now = Utc::now();
        let change = match self.rating_repo.find_by_pair(user_id, product_id).await? {
            Some(existing) => {
                let mut active: product_rating::ActiveModel = existing.into();
                active.value = Set(value);
                active.updated_at = Set(Some(now.into()));
                self.rating_repo.update(active).await?;
                RatingChange::Updated
            }
            None => {
                let model = product_rating::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    product_id: Set(product_id.to_string()),
                    value: Set(value),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                };
                self.rating_repo.create(model).await?;
                RatingChange::Created
            }
        };

        self.counters
            .on_rating_set(user_id, product_id, value)
            .await;

        info!(user_id = %user_id, product_id = %product_id, value, change = ?change, "Rating set");
        Ok(change)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::testing::counter_service;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> ProductEngagementService {
        let db = Arc::new(db.into_connection());
        ProductEngagementService::new(
            ProductLikeRepository::new(db.clone()),
            ProductRatingRepository::new(db.clone()),
            ProductRepository::new(db.clone()),
            counter_service(db),
        )
    }

    #[tokio::test]
    async fn test_rating_out_of_range_rejected_before_queries() {
        // No query results queued: touching the database would fail differently.
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        for value in [-1, 6] {
            let result = service.set_rating("user1", "p1", value).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_like_missing_product_returns_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<vitrine_db::entities::product::Model>::new()]),
        );

        let result = service.toggle_like("user1", "missing").await;
        assert!(matches!(result, Err(AppError::ProductNotFound(_))));
    }
}
