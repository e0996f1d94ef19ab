//! Application configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Derived counter maintenance.
    #[serde(default)]
    pub counters: CounterConfig,
    /// Unique-visitor tracking.
    #[serde(default)]
    pub views: ViewConfig,
    /// Brand activity feed.
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix for all Redis keys. Empty means keys are written unprefixed.
    #[serde(default)]
    pub prefix: String,
    /// Upper bound for a single Redis command, in milliseconds.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl RedisConfig {
    /// Command timeout as a [`Duration`].
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Counter maintenance configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    /// Rebuild every counter from the edge tables when the server starts.
    #[serde(default)]
    pub rebuild_on_startup: bool,
    /// Number of entity ids fetched per page during a rebuild.
    #[serde(default = "default_rebuild_batch_size")]
    pub rebuild_batch_size: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            rebuild_on_startup: false,
            rebuild_batch_size: default_rebuild_batch_size(),
        }
    }
}

/// Unique-visitor tracking configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewConfig {
    /// Forget visitors not seen for this many days. `None` keeps them forever.
    #[serde(default)]
    pub retention_days: Option<u32>,
}

impl ViewConfig {
    /// Retention window as a [`Duration`], if one is configured.
    #[must_use]
    pub fn retention(&self) -> Option<Duration> {
        self.retention_days
            .map(|days| Duration::from_secs(u64::from(days) * 24 * 60 * 60))
    }
}

/// Activity feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Repeated (brand, verb, target) actions inside this window are coalesced.
    #[serde(default = "default_suppression_window_hours")]
    pub suppression_window_hours: i64,
    /// How many already-seen entries are appended after the unseen ones.
    #[serde(default = "default_seen_tail")]
    pub seen_tail: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            suppression_window_hours: default_suppression_window_hours(),
            seen_tail: default_seen_tail(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_command_timeout_ms() -> u64 {
    500
}

const fn default_rebuild_batch_size() -> u64 {
    500
}

const fn default_suppression_window_hours() -> i64 {
    6
}

const fn default_seen_tail() -> u64 {
    10
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `VITRINE_ENV`)
    /// 3. Environment variables with `VITRINE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("VITRINE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VITRINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("VITRINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
