//! Product rating repository.

use std::sync::Arc;

use crate::entities::{ProductRating, product_rating};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use vitrine_common::{AppError, AppResult};

/// Product rating repository for database operations.
#[derive(Clone)]
pub struct ProductRatingRepository {
    db: Arc<DatabaseConnection>,
}

impl ProductRatingRepository {
    /// Create a new product rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's rating of a product.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> AppResult<Option<product_rating::Model>> {
        ProductRating::find()
            .filter(product_rating::Column::UserId.eq(user_id))
            .filter(product_rating::Column::ProductId.eq(product_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a rating.
    pub async fn create(
        &self,
        model: product_rating::ActiveModel,
    ) -> AppResult<product_rating::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| super::map_insert_err(e, "Rating"))
    }

    /// Update a rating.
    pub async fn update(
        &self,
        model: product_rating::ActiveModel,
    ) -> AppResult<product_rating::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ids of the users who rated a product.
    pub async fn find_user_ids_by_product(&self, product_id: &str) -> AppResult<Vec<String>> {
        let rows = ProductRating::find()
            .filter(product_rating::Column::ProductId.eq(product_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }

    /// Count ratings of a product.
    pub async fn count_by_product(&self, product_id: &str) -> AppResult<u64> {
        ProductRating::find()
            .filter(product_rating::Column::ProductId.eq(product_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count ratings given by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        ProductRating::find()
            .filter(product_rating::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
