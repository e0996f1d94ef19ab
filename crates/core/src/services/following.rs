//! Following service (user → user).

use crate::services::counters::CounterService;
use chrono::Utc;
use sea_orm::Set;
use tracing::info;
use vitrine_common::{AppError, AppResult, IdGenerator};
use vitrine_db::{
    entities::follow::{self, FollowStatus},
    repositories::{FollowRepository, UserRepository},
};

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    counters: CounterService,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(
        follow_repo: FollowRepository,
        user_repo: UserRepository,
        counters: CounterService,
    ) -> Self {
        Self {
            follow_repo,
            user_repo,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    ///
    /// Following a private user creates a pending request instead.
    pub async fn follow(&self, from_user_id: &str, to_user_id: &str) -> AppResult<FollowResult> {
        if from_user_id == to_user_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        if let Some(existing) = self.follow_repo.find_by_pair(from_user_id, to_user_id).await? {
            let msg = match existing.status {
                FollowStatus::Accepted => "Already following",
                FollowStatus::Pending => "Follow request already pending",
            };
            return Err(AppError::BadRequest(msg.to_string()));
        }

        let target = self.user_repo.get_active_by_id(to_user_id).await?;

        let now = Utc::now();
        let (status, allowed_at) = if target.is_private {
            (FollowStatus::Pending, None)
        } else {
            (FollowStatus::Accepted, Some(now.into()))
        };

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            from_user_id: Set(from_user_id.to_string()),
            to_user_id: Set(to_user_id.to_string()),
            status: Set(status),
            created_at: Set(now.into()),
            allowed_at: Set(allowed_at),
        };
        self.follow_repo.create(model).await?;

        self.counters
            .on_follow_created(from_user_id, to_user_id, status)
            .await;

        info!(from = %from_user_id, to = %to_user_id, status = ?status, "Follow created");

        Ok(match status {
            FollowStatus::Accepted => FollowResult::Following,
            FollowStatus::Pending => FollowResult::Pending,
        })
    }

    /// Unfollow a user, or cancel a pending request.
    pub async fn unfollow(&self, from_user_id: &str, to_user_id: &str) -> AppResult<()> {
        let edge = self
            .follow_repo
            .find_by_pair(from_user_id, to_user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Not following".to_string()))?;

        self.follow_repo.delete(&edge.id).await?;

        self.counters
            .on_follow_deleted(from_user_id, to_user_id, edge.status)
            .await;

        info!(from = %from_user_id, to = %to_user_id, status = ?edge.status, "Follow removed");
        Ok(())
    }

    /// Accept a pending request. Only the target of the request may call this.
    pub async fn accept_request(&self, target_id: &str, requester_id: &str) -> AppResult<()> {
        let edge = self.get_pending(target_id, requester_id).await?;

        let mut active: follow::ActiveModel = edge.into();
        active.status = Set(FollowStatus::Accepted);
        active.allowed_at = Set(Some(Utc::now().into()));
        self.follow_repo.update(active).await?;

        self.counters
            .on_follow_accepted(requester_id, target_id)
            .await;

        info!(from = %requester_id, to = %target_id, "Follow request accepted");
        Ok(())
    }

    /// Reject a pending request.
    pub async fn reject_request(&self, target_id: &str, requester_id: &str) -> AppResult<()> {
        let edge = self.get_pending(target_id, requester_id).await?;
        self.follow_repo.delete(&edge.id).await?;

        info!(from = %requester_id, to = %target_id, "Follow request rejected");
        Ok(())
    }

    async fn get_pending(&self, target_id: &str, requester_id: &str) -> AppResult<follow::Model> {
        match self.follow_repo.find_by_pair(requester_id, target_id).await? {
            Some(edge) if edge.status == FollowStatus::Pending => Ok(edge),
            _ => Err(AppError::NotFound("Follow request not found".to_string())),
        }
    }

    /// Get accepted followers of a user.
    pub async fn get_followers(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        self.follow_repo.find_followers(user_id, limit, until_id).await
    }

    /// Get users a user follows.
    pub async fn get_followings(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        self.follow_repo.find_followings(user_id, limit, until_id).await
    }

    /// Get pending requests received by a user.
    pub async fn get_pending_requests(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        self.follow_repo
            .find_pending_received(user_id, limit, until_id)
            .await
    }
}

/// Result of a follow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowResult {
    /// The user is now following the target.
    Following,
    /// A follow request was created (target is private).
    Pending,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::testing::counter_service;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_follow(from: &str, to: &str, status: FollowStatus) -> follow::Model {
        follow::Model {
            id: "f1".to_string(),
            from_user_id: from.to_string(),
            to_user_id: to.to_string(),
            status,
            created_at: Utc::now().into(),
            allowed_at: None,
        }
    }

    fn service(db: MockDatabase) -> FollowingService {
        let db = Arc::new(db.into_connection());
        FollowingService::new(
            FollowRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            counter_service(db),
        )
    }

    #[tokio::test]
    async fn test_follow_yourself_returns_error() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = service.follow("user1", "user1").await;

        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("Cannot follow yourself")),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_follow_already_following_returns_error() {
        let edge = create_test_follow("user1", "user2", FollowStatus::Accepted);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[edge]]),
        );

        match service.follow("user1", "user2").await {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("Already following")),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_follow_already_requested_returns_error() {
        let edge = create_test_follow("user1", "user2", FollowStatus::Pending);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[edge]]),
        );

        match service.follow("user1", "user2").await {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("already pending")),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_accept_without_request_is_not_found() {
        let edge = create_test_follow("user2", "user1", FollowStatus::Accepted);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[edge]]),
        );

        let result = service.accept_request("user1", "user2").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_returns_error() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()]),
        );

        let result = service.unfollow("user1", "user2").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
