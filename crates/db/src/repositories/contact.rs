//! Contact (brand follow) repository.

use std::sync::Arc;

use crate::entities::{Contact, contact};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use vitrine_common::{AppError, AppResult};

/// Contact repository for database operations.
#[derive(Clone)]
pub struct ContactRepository {
    db: Arc<DatabaseConnection>,
}

impl ContactRepository {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the contact between a user and a brand.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        brand_id: &str,
    ) -> AppResult<Option<contact::Model>> {
        Contact::find()
            .filter(contact::Column::FromUserId.eq(user_id))
            .filter(contact::Column::ToBrandId.eq(brand_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a contact.
    pub async fn create(&self, model: contact::ActiveModel) -> AppResult<contact::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| super::map_insert_err(e, "Contact"))
    }

    /// Delete a contact.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Contact::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count users following a brand.
    pub async fn count_followers(&self, brand_id: &str) -> AppResult<u64> {
        Contact::find()
            .filter(contact::Column::ToBrandId.eq(brand_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count brands a user follows.
    pub async fn count_followings(&self, user_id: &str) -> AppResult<u64> {
        Contact::find()
            .filter(contact::Column::FromUserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of every brand a user follows.
    pub async fn find_brand_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let contacts = Contact::find()
            .filter(contact::Column::FromUserId.eq(user_id))
            .order_by_asc(contact::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(contacts.into_iter().map(|c| c.to_brand_id).collect())
    }
}
