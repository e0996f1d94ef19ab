//! Follow edge repository.

use std::sync::Arc;

use crate::entities::{
    Follow,
    follow::{self, FollowStatus},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use vitrine_common::{AppError, AppResult};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the edge between two users, whatever its status.
    pub async fn find_by_pair(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FromUserId.eq(from_user_id))
            .filter(follow::Column::ToUserId.eq(to_user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a follow edge.
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| super::map_insert_err(e, "Follow"))
    }

    /// Update a follow edge.
    pub async fn update(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a follow edge.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Follow::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count accepted edges pointing at a user.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::ToUserId.eq(user_id))
            .filter(follow::Column::Status.eq(FollowStatus::Accepted))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count accepted edges leaving a user.
    pub async fn count_followings(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::FromUserId.eq(user_id))
            .filter(follow::Column::Status.eq(FollowStatus::Accepted))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Accepted followers of a user (paginated, newest first).
    pub async fn find_followers(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        self.find_page(
            follow::Column::ToUserId,
            user_id,
            FollowStatus::Accepted,
            limit,
            until_id,
        )
        .await
    }

    /// Users a user follows (paginated, newest first).
    pub async fn find_followings(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        self.find_page(
            follow::Column::FromUserId,
            user_id,
            FollowStatus::Accepted,
            limit,
            until_id,
        )
        .await
    }

    /// Pending requests received by a user (paginated, newest first).
    pub async fn find_pending_received(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        self.find_page(
            follow::Column::ToUserId,
            user_id,
            FollowStatus::Pending,
            limit,
            until_id,
        )
        .await
    }

    async fn find_page(
        &self,
        side: follow::Column,
        user_id: &str,
        status: FollowStatus,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        let mut query = Follow::find()
            .filter(side.eq(user_id))
            .filter(follow::Column::Status.eq(status))
            .order_by_desc(follow::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
