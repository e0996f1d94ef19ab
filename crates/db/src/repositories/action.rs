//! Brand feed action repository.

use std::sync::Arc;

use crate::entities::{
    Action,
    action::{self, Verb},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use vitrine_common::{AppError, AppResult};

/// A stored target reference: `(target_kind, target_id)`.
pub type TargetRef<'a> = Option<(&'a str, &'a str)>;

/// Action repository for database operations.
#[derive(Clone)]
pub struct ActionRepository {
    db: Arc<DatabaseConnection>,
}

fn matching_unseen(brand_id: &str, verb: Verb, target: TargetRef<'_>) -> Select<Action> {
    let query = Action::find()
        .filter(action::Column::BrandId.eq(brand_id))
        .filter(action::Column::Verb.eq(verb))
        .filter(action::Column::Seen.eq(false));

    match target {
        Some((kind, id)) => query
            .filter(action::Column::TargetKind.eq(kind))
            .filter(action::Column::TargetId.eq(id)),
        None => query
            .filter(action::Column::TargetKind.is_null())
            .filter(action::Column::TargetId.is_null()),
    }
}

impl ActionRepository {
    /// Create a new action repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create an action.
    pub async fn create(&self, model: action::ActiveModel) -> AppResult<action::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an unseen (brand, verb, target) action created at or after `since`.
    pub async fn find_unseen_since(
        &self,
        brand_id: &str,
        verb: Verb,
        target: TargetRef<'_>,
        since: DateTimeWithTimeZone,
    ) -> AppResult<Option<action::Model>> {
        matching_unseen(brand_id, verb, target)
            .filter(action::Column::CreatedAt.gte(since))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the most recent unseen (brand, verb, target) action.
    pub async fn find_latest_unseen(
        &self,
        brand_id: &str,
        verb: Verb,
        target: TargetRef<'_>,
    ) -> AppResult<Option<action::Model>> {
        matching_unseen(brand_id, verb, target)
            .order_by_desc(action::Column::CreatedAt)
            .order_by_desc(action::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark an action as seen.
    pub async fn mark_seen(&self, id: &str) -> AppResult<()> {
        Action::update_many()
            .col_expr(action::Column::Seen, Expr::value(true))
            .filter(action::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete an action.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Action::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Every unseen action of the given brands, oldest first.
    pub async fn find_unseen_for_brands(
        &self,
        brand_ids: &[String],
    ) -> AppResult<Vec<action::Model>> {
        if brand_ids.is_empty() {
            return Ok(vec![]);
        }

        Action::find()
            .filter(action::Column::BrandId.is_in(brand_ids.to_vec()))
            .filter(action::Column::Seen.eq(false))
            .order_by_asc(action::Column::CreatedAt)
            .order_by_asc(action::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The newest `limit` seen actions of the given brands, newest first.
    pub async fn find_recent_seen_for_brands(
        &self,
        brand_ids: &[String],
        limit: u64,
    ) -> AppResult<Vec<action::Model>> {
        if brand_ids.is_empty() || limit == 0 {
            return Ok(vec![]);
        }

        Action::find()
            .filter(action::Column::BrandId.is_in(brand_ids.to_vec()))
            .filter(action::Column::Seen.eq(true))
            .order_by_desc(action::Column::CreatedAt)
            .order_by_desc(action::Column::Id)
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
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_action(id: &str, verb: Verb, seen: bool) -> action::Model {
        action::Model {
            id: id.to_string(),
            brand_id: "brand1".to_string(),
            verb,
            target_kind: Some("product".to_string()),
            target_id: Some("p1".to_string()),
            seen,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_unseen_since_found() {
        let existing = create_test_action("a1", Verb::Product, false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let repo = ActionRepository::new(db);
        let since = (Utc::now() - Duration::hours(6)).into();
        let found = repo
            .find_unseen_since("brand1", Verb::Product, Some(("product", "p1")), since)
            .await
            .unwrap();

        assert_eq!(found.unwrap().id, "a1");
    }

    #[tokio::test]
    async fn test_find_latest_unseen_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<action::Model>::new()])
                .into_connection(),
        );

        let repo = ActionRepository::new(db);
        let found = repo
            .find_latest_unseen("brand1", Verb::Sale, None)
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_mark_seen() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ActionRepository::new(db);
        assert!(repo.mark_seen("a1").await.is_ok());
    }

    #[tokio::test]
    async fn test_feed_queries_skip_empty_brand_list() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ActionRepository::new(db);

        assert!(repo.find_unseen_for_brands(&[]).await.unwrap().is_empty());
        assert!(
            repo.find_recent_seen_for_brands(&[], 10)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
