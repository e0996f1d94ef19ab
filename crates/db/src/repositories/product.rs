//! Product repository.

use std::sync::Arc;

use crate::entities::{Product, product};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use vitrine_common::{AppError, AppResult};

/// Product repository for database operations.
#[derive(Clone)]
pub struct ProductRepository {
    db: Arc<DatabaseConnection>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a product by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<product::Model>> {
        Product::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a product by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<product::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProductNotFound(id.to_string()))
    }

    /// Find an active product by ID.
    pub async fn get_active_by_id(&self, id: &str) -> AppResult<product::Model> {
        match self.find_by_id(id).await? {
            Some(product) if product.is_active => Ok(product),
            _ => Err(AppError::ProductNotFound(id.to_string())),
        }
    }

    /// Find products by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<product::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Product::find()
            .filter(product::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new product.
    pub async fn create(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a product.
    pub async fn update(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a product.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Product::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Walk all products in ID order, `limit` at a time, starting after `after_id`.
    pub async fn find_page_after(
        &self,
        after_id: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<product::Model>> {
        let mut query = Product::find().order_by_asc(product::Column::Id);

        if let Some(id) = after_id {
            query = query.filter(product::Column::Id.gt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_product(id: &str) -> product::Model {
        product::Model {
            id: id.to_string(),
            brand_id: "b1".to_string(),
            name: "Linen shirt".to_string(),
            slug: id.to_string(),
            price: 4_900,
            is_sale: false,
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_product("p1")]])
                .into_connection(),
        );

        let repo = ProductRepository::new(db);
        let product = repo.get_by_id("p1").await.unwrap();

        assert_eq!(product.brand_id, "b1");
        assert_eq!(product.price, 4_900);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<product::Model>::new()])
                .into_connection(),
        );

        let repo = ProductRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ProductRepository::new(db);
        assert!(repo.delete("p1").await.is_ok());
    }
}
