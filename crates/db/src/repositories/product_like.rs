//! Product like repository.

use std::sync::Arc;

use crate::entities::{ProductLike, product_like};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use vitrine_common::{AppError, AppResult};

/// Product like repository for database operations.
#[derive(Clone)]
pub struct ProductLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl ProductLikeRepository {
    /// Create a new product like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's like on a product.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> AppResult<Option<product_like::Model>> {
        ProductLike::find()
            .filter(product_like::Column::UserId.eq(user_id))
            .filter(product_like::Column::ProductId.eq(product_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a like.
    pub async fn create(
        &self,
        model: product_like::ActiveModel,
    ) -> AppResult<product_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| super::map_insert_err(e, "Like"))
    }

    /// Delete a like.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        ProductLike::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Ids of the users who liked a product.
    pub async fn find_user_ids_by_product(&self, product_id: &str) -> AppResult<Vec<String>> {
        let rows = ProductLike::find()
            .filter(product_like::Column::ProductId.eq(product_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }

    /// Count likes on a product.
    pub async fn count_by_product(&self, product_id: &str) -> AppResult<u64> {
        ProductLike::find()
            .filter(product_like::Column::ProductId.eq(product_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes given by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        ProductLike::find()
            .filter(product_like::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
