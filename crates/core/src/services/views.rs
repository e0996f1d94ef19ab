//! Unique-visitor view tracking.

use std::net::IpAddr;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use vitrine_common::AppResult;

use super::counter_store::{CounterStoreService, EntityKind, views_key};

/// Network details of the request that triggered a detail read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestNetworkInfo {
    /// Raw `X-Forwarded-For` header value, if present.
    pub forwarded_for: Option<String>,
    /// Peer address of the TCP connection.
    pub remote_addr: Option<IpAddr>,
}

impl RequestNetworkInfo {
    /// Identify the visitor.
    ///
    /// The last non-empty `X-Forwarded-For` entry wins over the peer address.
    #[must_use]
    pub fn visitor_key(&self) -> Option<String> {
        self.forwarded_for
            .as_deref()
            .and_then(|header| {
                header
                    .rsplit(',')
                    .map(str::trim)
                    .find(|entry| !entry.is_empty())
            })
            .map(str::to_string)
            .or_else(|| self.remote_addr.map(|addr| addr.to_string()))
    }
}

/// Records unique visitors per entity in the counter store.
///
/// Each visitor is a sorted-set member scored with its last-seen time in unix
/// milliseconds. With a retention window configured, visitors last seen
/// before the window are pruned on every record.
#[derive(Clone)]
pub struct ViewTracker {
    store: CounterStoreService,
    retention: Option<Duration>,
}

impl ViewTracker {
    /// Create a tracker that keeps visitors forever.
    #[must_use]
    pub const fn new(store: CounterStoreService) -> Self {
        Self {
            store,
            retention: None,
        }
    }

    /// Forget visitors not seen within `retention`.
    #[must_use]
    pub fn with_retention(mut self, retention: Option<Duration>) -> Self {
        self.retention = retention;
        self
    }

    /// Add a visitor to the entity's set, refreshing its last-seen score.
    pub async fn record_view(
        &self,
        kind: EntityKind,
        entity_id: &str,
        visitor_key: &str,
    ) -> AppResult<()> {
        let key = views_key(kind, entity_id);
        let now_ms = Utc::now().timestamp_millis();

        self.store
            .set_member_score(&key, visitor_key, now_ms as f64)
            .await?;

        if let Some(retention) = self.retention {
            let cutoff = now_ms - retention.as_millis() as i64;
            let removed = self.store.remove_members_up_to(&key, cutoff as f64).await?;
            if removed > 0 {
                debug!(key = %key, removed, "Pruned expired visitors");
            }
        }

        Ok(())
    }

    /// Number of distinct visitors recorded for the entity.
    pub async fn count_views(&self, kind: EntityKind, entity_id: &str) -> AppResult<u64> {
        self.store.count_members(&views_key(kind, entity_id)).await
    }

    /// Record the requester of a detail read. Never fails.
    pub async fn record_detail_view(
        &self,
        kind: EntityKind,
        entity_id: &str,
        network: &RequestNetworkInfo,
    ) {
        let Some(visitor) = network.visitor_key() else {
            debug!(kind = %kind, id = %entity_id, "No visitor address, view not recorded");
            return;
        };

        if let Err(e) = self.record_view(kind, entity_id, &visitor).await {
            warn!(kind = %kind, id = %entity_id, error = %e, "Failed to record view");
        }
    }

    /// Unique view count, or zero when the store is unavailable.
    pub async fn get_unique_view_count(&self, kind: EntityKind, entity_id: &str) -> u64 {
        match self.count_views(kind, entity_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    kind = %kind,
                    id = %entity_id,
                    error = %e,
                    "Failed to count views, defaulting to 0"
                );
                0
            }
        }
    }
}
