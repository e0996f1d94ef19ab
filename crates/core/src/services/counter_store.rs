//! Counter store abstraction.
//!
//! Derived counters and unique-visitor sets live in a key-value store that
//! holds no business logic. Services receive the store as an injected
//! [`CounterStoreService`] so the process bootstrap owns its lifecycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use vitrine_common::{AppError, AppResult};

/// Kind of entity a counter or visitor set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Brand,
    Product,
}

impl EntityKind {
    /// Key segment for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Brand => "brand",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a derived counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterName {
    /// Accepted follow edges (users) or contacts (brands) pointing at the entity.
    FollowersCount,
    /// Accepted follow edges leaving a user.
    FollowingsCountUser,
    /// Contacts leaving a user.
    FollowingsCountBrand,
    /// Likes given by a user or received by a product.
    LikeCount,
    /// Ratings given by a user or received by a product.
    RatingCount,
}

impl CounterName {
    /// Key segment for this counter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FollowersCount => "followers_count",
            Self::FollowingsCountUser => "followings_count_user",
            Self::FollowingsCountBrand => "followings_count_brand",
            Self::LikeCount => "like_count",
            Self::RatingCount => "rating_count",
        }
    }

    /// Counters maintained for an entity kind.
    #[must_use]
    pub const fn for_kind(kind: EntityKind) -> &'static [Self] {
        match kind {
            EntityKind::User => &[
                Self::FollowersCount,
                Self::FollowingsCountUser,
                Self::FollowingsCountBrand,
                Self::LikeCount,
                Self::RatingCount,
            ],
            EntityKind::Brand => &[Self::FollowersCount],
            EntityKind::Product => &[Self::LikeCount, Self::RatingCount],
        }
    }
}

impl fmt::Display for CounterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<kind>:<id>:<counter>`
#[must_use]
pub fn counter_key(kind: EntityKind, id: &str, name: CounterName) -> String {
    format!("{kind}:{id}:{name}")
}

/// `<kind>:views:<id>`
#[must_use]
pub fn views_key(kind: EntityKind, id: &str) -> String {
    format!("{kind}:views:{id}")
}

/// Key-value storage primitives used by the counter subsystem.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read an integer counter. `None` when the key was never written.
    async fn get(&self, key: &str) -> AppResult<Option<i64>>;

    /// Overwrite an integer counter.
    async fn set(&self, key: &str, value: i64) -> AppResult<()>;

    /// Add `member` to a sorted set, or refresh its score if present.
    async fn set_member_score(&self, key: &str, member: &str, score: f64) -> AppResult<()>;

    /// Number of members in a sorted set.
    async fn count_members(&self, key: &str) -> AppResult<u64>;

    /// Remove members whose score is at or below `max_score`.
    async fn remove_members_up_to(&self, key: &str, max_score: f64) -> AppResult<u64>;
}

/// Shared handle to a counter store.
pub type CounterStoreService = Arc<dyn CounterStore>;

/// In-process counter store.
///
/// Used by tests and single-node development setups. Counts every read so
/// callers can assert how many store round-trips a code path costs, and can
/// be switched into a failing mode to simulate an unreachable store.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, i64>>,
    sets: Mutex<HashMap<String, HashMap<String, f64>>>,
    reads: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryCounterStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` and `count_members` calls served so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Read a counter without touching the read statistics.
    pub async fn peek(&self, key: &str) -> Option<i64> {
        self.counters.lock().await.get(key).copied()
    }

    /// Every counter key currently stored, sorted.
    pub async fn counter_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.counters.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Score of a sorted-set member.
    pub async fn member_score(&self, key: &str, member: &str) -> Option<f64> {
        self.sets
            .lock()
            .await
            .get(key)
            .and_then(|members| members.get(member).copied())
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Redis("counter store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn get(&self, key: &str) -> AppResult<Option<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.counters.lock().await.get(key).copied())
    }

    async fn set(&self, key: &str, value: i64) -> AppResult<()> {
        self.check()?;
        self.counters.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn set_member_score(&self, key: &str, member: &str, score: f64) -> AppResult<()> {
        self.check()?;
        self.sets
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn count_members(&self, key: &str) -> AppResult<u64> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .sets
            .lock()
            .await
            .get(key)
            .map_or(0, |members| members.len() as u64))
    }

    async fn remove_members_up_to(&self, key: &str, max_score: f64) -> AppResult<u64> {
        self.check()?;
        let mut sets = self.sets.lock().await;
        let Some(members) = sets.get_mut(key) else {
            return Ok(0);
        };
        let before = members.len();
        members.retain(|_, score| *score > max_score);
        Ok((before - members.len()) as u64)
    }
}
