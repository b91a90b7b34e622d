//! Redis-backed store
//!
//! Requires the `redis` feature to be enabled.

use super::{KeyValueStore, StoreResult, StoreValue, error::StoreError};
use crate::error::{RecallError, RecallResult};
use ::redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use async_trait::async_trait;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::{debug, info, instrument};

/// Environment variable holding the Redis connection URL
pub const REDIS_URL_ENV: &str = "RECALL_REDIS_URL";

/// Environment variable holding the connect timeout, in whole seconds
pub const REDIS_CONNECT_TIMEOUT_ENV: &str = "RECALL_REDIS_CONNECT_TIMEOUT_SECS";

const DEFAULT_URL: &str = "redis://127.0.0.1:6379/";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const URL_SCHEMES: [&str; 4] = ["redis", "rediss", "unix", "redis+unix"];

/// Redis connection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379/0")
    pub url: String,
    /// How long to wait for the initial connection
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl RedisConfig {
    /// Create a configuration for the given URL with the default timeout
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Create from environment variables
    ///
    /// Unset variables and unparsable timeouts fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = lookup(REDIS_URL_ENV).unwrap_or_else(|| DEFAULT_URL.to_string());
        let connect_timeout = lookup(REDIS_CONNECT_TIMEOUT_ENV)
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT);

        Self {
            url,
            connect_timeout,
        }
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Check the settings before any connection attempt
    ///
    /// The URL must be non-empty with a scheme the client understands, and the
    /// connect timeout must be non-zero.
    pub fn validate(&self) -> RecallResult<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(RecallError::configuration("Redis URL is empty"));
        }

        let scheme = url.split_once("://").map(|(scheme, _)| scheme);
        if !scheme.is_some_and(|scheme| URL_SCHEMES.contains(&scheme)) {
            return Err(RecallError::configuration(format!(
                "Redis URL '{url}' must start with one of {}",
                URL_SCHEMES.map(|scheme| format!("{scheme}://")).join(", ")
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(RecallError::configuration(
                "Redis connect timeout must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Redis-backed key-value store
///
/// Holds one multiplexed connection; every call clones the handle, which is
/// cheap and lets concurrent callers pipeline over the same socket.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to the server described by `config`
    ///
    /// Invalid settings fail with a configuration error before any I/O.
    #[cfg_attr(feature = "tracing", instrument(skip(config), fields(url = %config.url)))]
    pub async fn connect(config: &RedisConfig) -> RecallResult<Self> {
        config.validate()?;

        let client = Client::open(config.url.as_str())
            .map_err(|e| StoreError::connection(format!("Redis client error: {e}")))?;

        let conn = tokio::time::timeout(
            config.connect_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            StoreError::connection(format!(
                "Timed out after {:?} connecting to {}",
                config.connect_timeout, config.url
            ))
        })?
        .map_err(StoreError::from)?;

        #[cfg(feature = "tracing")]
        info!("Connected to Redis");

        Ok(Self { conn })
    }

    /// Connect using [`RedisConfig::from_env`]
    pub async fn from_env() -> RecallResult<Self> {
        Self::connect(&RedisConfig::from_env()).await
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set(&self, key: &str, value: StoreValue) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value.to_bytes()).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1i64).await?;
        Ok(value)
    }

    async fn rpush(&self, key: &str, value: &str) -> StoreResult<usize> {
        let mut conn = self.conn.clone();
        let len: usize = conn.rpush(key, value).await?;
        Ok(len)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let items: Vec<String> = conn.lrange(key, start, stop).await?;
        Ok(items)
    }

    async fn flush_all(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = ::redis::cmd("FLUSHDB").query_async(&mut conn).await?;

        #[cfg(feature = "tracing")]
        debug!("Flushed Redis database");

        Ok(())
    }
}
