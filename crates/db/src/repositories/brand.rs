//! Brand repository.

use std::sync::Arc;

use crate::entities::{Brand, brand};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use vitrine_common::{AppError, AppResult};

/// Brand repository for database operations.
#[derive(Clone)]
pub struct BrandRepository {
    db: Arc<DatabaseConnection>,
}

impl BrandRepository {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a brand by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<brand::Model>> {
        Brand::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an active brand by ID, returning an error if missing or inactive.
    pub async fn get_active_by_id(&self, id: &str) -> AppResult<brand::Model> {
        match self.find_by_id(id).await? {
            Some(brand) if brand.is_active => Ok(brand),
            _ => Err(AppError::BrandNotFound(id.to_string())),
        }
    }

    /// Find brands by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<brand::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Brand::find()
            .filter(brand::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new brand.
    pub async fn create(&self, model: brand::ActiveModel) -> AppResult<brand::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Walk all brands in ID order, `limit` at a time, starting after `after_id`.
    pub async fn find_page_after(
        &self,
        after_id: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<brand::Model>> {
        let mut query = Brand::find().order_by_asc(brand::Column::Id);

        if let Some(id) = after_id {
            query = query.filter(brand::Column::Id.gt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
