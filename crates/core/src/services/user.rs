//! User service.

use vitrine_common::AppResult;
use vitrine_db::{entities::user, repositories::UserRepository};

/// User lookups used by profile handlers.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Get an active user.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_active_by_id(user_id).await
    }

    /// Get users by ID, preserving the order of `ids` and skipping missing ones.
    pub async fn get_many(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        let mut users = self.user_repo.find_by_ids(ids).await?;
        users.sort_by_key(|u| ids.iter().position(|id| id == &u.id));
        Ok(users)
    }
}
