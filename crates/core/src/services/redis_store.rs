//! Redis-backed counter store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::{KeysInterface, SortedSetsInterface};
use vitrine_common::{AppError, AppResult, config::RedisConfig};

use super::counter_store::CounterStore;

/// Counter store on a shared `fred` client.
///
/// Every command is bounded by the configured timeout; a timeout is reported
/// as [`AppError::Redis`] like any other store failure.
#[derive(Clone)]
pub struct RedisCounterStore {
    redis: Arc<RedisClient>,
    prefix: String,
    timeout: Duration,
}

impl RedisCounterStore {
    /// Create a store from an already connected client.
    #[must_use]
    pub const fn new(redis: Arc<RedisClient>, prefix: String, timeout: Duration) -> Self {
        Self {
            redis,
            prefix,
            timeout,
        }
    }

    /// Create a store using the `[redis]` configuration section.
    #[must_use]
    pub fn from_config(redis: Arc<RedisClient>, config: &RedisConfig) -> Self {
        Self::new(redis, config.prefix.clone(), config.command_timeout())
    }

    fn key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{key}", self.prefix)
        }
    }

    async fn run<T, F>(&self, command: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, fred::error::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| AppError::Redis(format!("{command}: {e}"))),
            Err(_) => Err(AppError::Redis(format!(
                "{command}: timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get(&self, key: &str) -> AppResult<Option<i64>> {
        self.run("GET", self.redis.get::<Option<i64>, _>(self.key(key)))
            .await
    }

    async fn set(&self, key: &str, value: i64) -> AppResult<()> {
        self.run(
            "SET",
            self.redis
                .set::<(), _, _>(self.key(key), value, None, None, false),
        )
        .await
    }

    async fn set_member_score(&self, key: &str, member: &str, score: f64) -> AppResult<()> {
        self.run(
            "ZADD",
            self.redis.zadd::<(), _, _>(
                self.key(key),
                None,
                None,
                false,
                false,
                (score, member.to_string()),
            ),
        )
        .await
    }

    async fn count_members(&self, key: &str) -> AppResult<u64> {
        self.run("ZCARD", self.redis.zcard::<u64, _>(self.key(key)))
            .await
    }

    async fn remove_members_up_to(&self, key: &str, max_score: f64) -> AppResult<u64> {
        self.run(
            "ZREMRANGEBYSCORE",
            self.redis
                .zremrangebyscore::<u64, _, _, _>(self.key(key), "-inf", max_score),
        )
        .await
    }
}
