//! Brand action feed.
//!
//! Brands emit actions (new product, sale, promo...) that show up in the feed
//! of every user following them. A repeated (brand, verb, target) action is
//! suppressed while an unseen copy younger than the suppression window
//! exists, which bounds the noise of rapid repeated events.

use chrono::{Duration, Utc};
use sea_orm::Set;
use serde::Serialize;
use tracing::debug;
use vitrine_common::{AppError, AppResult, IdGenerator, config::FeedConfig};
use vitrine_db::{
    entities::action::{self, Verb},
    repositories::ActionRepository,
};

/// The object a feed action refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ActionTarget {
    Product(String),
    Brand(String),
}

impl ActionTarget {
    /// Stored type tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Product(_) => "product",
            Self::Brand(_) => "brand",
        }
    }

    /// Referenced entity ID.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Product(id) | Self::Brand(id) => id,
        }
    }

    /// Rebuild a target from its stored columns.
    pub fn from_parts(kind: Option<&str>, id: Option<&str>) -> AppResult<Option<Self>> {
        match (kind, id) {
            (None, None) => Ok(None),
            (Some("product"), Some(id)) => Ok(Some(Self::Product(id.to_string()))),
            (Some("brand"), Some(id)) => Ok(Some(Self::Brand(id.to_string()))),
            (Some(kind), Some(_)) => Err(AppError::Internal(format!(
                "Unknown feed target kind: {kind}"
            ))),
            _ => Err(AppError::Internal(
                "Feed target kind and id must be set together".to_string(),
            )),
        }
    }
}

fn target_ref(target: Option<&ActionTarget>) -> Option<(&str, &str)> {
    target.map(|t| (t.kind(), t.id()))
}

/// Result of [`ActionFeedService::record_brand_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    Suppressed,
}

/// How [`ActionFeedService::resolve_brand_action`] retires an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    Delete,
    MarkSeen,
}

/// Result of [`ActionFeedService::resolve_brand_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved,
    NotFound,
}

/// A feed entry with its target decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub id: String,
    pub brand_id: String,
    pub verb: Verb,
    pub target: Option<ActionTarget>,
    pub seen: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl TryFrom<action::Model> for FeedEntry {
    type Error = AppError;

    fn try_from(model: action::Model) -> AppResult<Self> {
        let target =
            ActionTarget::from_parts(model.target_kind.as_deref(), model.target_id.as_deref())?;
        Ok(Self {
            id: model.id,
            brand_id: model.brand_id,
            verb: model.verb,
            target,
            seen: model.seen,
            created_at: model.created_at,
        })
    }
}

/// Records, retires and assembles brand feed actions.
#[derive(Clone)]
pub struct ActionFeedService {
    action_repo: ActionRepository,
    id_gen: IdGenerator,
    suppression_window: Duration,
    seen_tail: u64,
}

impl ActionFeedService {
    /// Create a feed service with the default 6 hour window and 10 entry tail.
    #[must_use]
    pub fn new(action_repo: ActionRepository) -> Self {
        Self::with_config(action_repo, &FeedConfig::default())
    }

    /// Create a feed service from the `[feed]` configuration section.
    #[must_use]
    pub fn with_config(action_repo: ActionRepository, config: &FeedConfig) -> Self {
        Self {
            action_repo,
            id_gen: IdGenerator::new(),
            suppression_window: Duration::hours(config.suppression_window_hours),
            seen_tail: config.seen_tail,
        }
    }

    /// Record a brand action unless an unseen duplicate is still fresh.
    pub async fn record_brand_action(
        &self,
        brand_id: &str,
        verb: Verb,
        target: Option<&ActionTarget>,
    ) -> AppResult<RecordOutcome> {
        let now = Utc::now();
        let since = (now - self.suppression_window).into();

        if let Some(existing) = self
            .action_repo
            .find_unseen_since(brand_id, verb, target_ref(target), since)
            .await?
        {
            debug!(
                brand_id = %brand_id,
                verb = ?verb,
                existing = %existing.id,
                "Brand action suppressed"
            );
            return Ok(RecordOutcome::Suppressed);
        }

        let model = action::ActiveModel {
            id: Set(self.id_gen.generate()),
            brand_id: Set(brand_id.to_string()),
            verb: Set(verb),
            target_kind: Set(target.map(|t| t.kind().to_string())),
            target_id: Set(target.map(|t| t.id().to_string())),
            seen: Set(false),
            created_at: Set(now.into()),
        };
        let created = self.action_repo.create(model).await?;

        debug!(
            brand_id = %brand_id,
            verb = ?verb,
            action_id = %created.id,
            "Brand action recorded"
        );
        Ok(RecordOutcome::Recorded)
    }

    /// Retire the most recent unseen (brand, verb, target) action.
    ///
    /// A missing entry is reported as [`ResolveOutcome::NotFound`], not an error.
    pub async fn resolve_brand_action(
        &self,
        brand_id: &str,
        verb: Verb,
        target: Option<&ActionTarget>,
        mode: ResolveMode,
    ) -> AppResult<ResolveOutcome> {
        let Some(existing) = self
            .action_repo
            .find_latest_unseen(brand_id, verb, target_ref(target))
            .await?
        else {
            debug!(brand_id = %brand_id, verb = ?verb, "No unseen brand action to resolve");
            return Ok(ResolveOutcome::NotFound);
        };

        match mode {
            ResolveMode::Delete => self.action_repo.delete(&existing.id).await?,
            ResolveMode::MarkSeen => self.action_repo.mark_seen(&existing.id).await?,
        }

        debug!(action_id = %existing.id, mode = ?mode, "Brand action resolved");
        Ok(ResolveOutcome::Resolved)
    }

    /// Feed for a follower: every unseen entry of the followed brands, oldest
    /// first, followed by the newest seen entries in ascending order.
    pub async fn get_feed(
        &self,
        follower_id: &str,
        followed_brand_ids: &[String],
    ) -> AppResult<Vec<FeedEntry>> {
        let unseen = self
            .action_repo
            .find_unseen_for_brands(followed_brand_ids)
            .await?;
        let mut seen = self
            .action_repo
            .find_recent_seen_for_brands(followed_brand_ids, self.seen_tail)
            .await?;
        seen.reverse();

        debug!(
            follower_id = %follower_id,
            brands = followed_brand_ids.len(),
            unseen = unseen.len(),
            seen = seen.len(),
            "Feed assembled"
        );

        unseen
            .into_iter()
            .chain(seen)
            .map(FeedEntry::try_from)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_action(id: &str, seen: bool, minutes_ago: i64) -> action::Model {
        action::Model {
            id: id.to_string(),
            brand_id: "brand1".to_string(),
            verb: Verb::Product,
            target_kind: Some("product".to_string()),
            target_id: Some(format!("p-{id}")),
            seen,
            created_at: (Utc::now() - Duration::minutes(minutes_ago)).into(),
        }
    }

    #[test]
    fn test_target_round_trips_through_columns() {
        let target = ActionTarget::Product("p1".to_string());
        let parsed = ActionTarget::from_parts(Some(target.kind()), Some(target.id())).unwrap();
        assert_eq!(parsed, Some(target));
        assert_eq!(ActionTarget::from_parts(None, None).unwrap(), None);
    }

    #[test]
    fn test_unknown_target_kind_is_rejected() {
        let result = ActionTarget::from_parts(Some("contest"), Some("c1"));
        assert!(matches!(result, Err(AppError::Internal(_))));

        let result = ActionTarget::from_parts(Some("product"), None);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_record_suppressed_when_fresh_unseen_exists() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_action("a1", false, 30)]])
            .into_connection();

        let feed = ActionFeedService::new(ActionRepository::new(Arc::new(db)));
        let target = ActionTarget::Product("p-a1".to_string());
        let outcome = feed
            .record_brand_action("brand1", Verb::Product, Some(&target))
            .await
            .unwrap();

        assert_eq!(outcome, RecordOutcome::Suppressed);
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<action::Model>::new()])
            .into_connection();

        let feed = ActionFeedService::new(ActionRepository::new(Arc::new(db)));
        let outcome = feed
            .resolve_brand_action("brand1", Verb::Sale, None, ResolveMode::MarkSeen)
            .await
            .unwrap();

        assert_eq!(outcome, ResolveOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_delete() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_action("a1", false, 5)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let feed = ActionFeedService::new(ActionRepository::new(Arc::new(db)));
        let target = ActionTarget::Product("p-a1".to_string());
        let outcome = feed
            .resolve_brand_action("brand1", Verb::Product, Some(&target), ResolveMode::Delete)
            .await
            .unwrap();

        assert_eq!(outcome, ResolveOutcome::Resolved);
    }

    #[tokio::test]
    async fn test_feed_orders_unseen_then_seen_ascending() {
        let unseen = vec![
            create_test_action("u1", false, 50),
            create_test_action("u2", false, 40),
        ];
        // Repository returns seen entries newest first.
        let seen = vec![
            create_test_action("s2", true, 60),
            create_test_action("s1", true, 90),
        ];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([unseen, seen])
            .into_connection();

        let feed = ActionFeedService::new(ActionRepository::new(Arc::new(db)));
        let entries = feed
            .get_feed("follower", &["brand1".to_string()])
            .await
            .unwrap();

        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2", "s1", "s2"]);
        assert!(!entries[0].seen);
        assert!(entries[3].seen);
    }
}
