//! # Error Handling
//!
//! This module provides the error type shared by the cache, the instrumentation
//! wrappers and the replay engine.
//!
//! ## 📊 Error Categories
//!
//! | Error Type | When It Occurs | How to Fix |
//! |------------|----------------|------------|
//! | `Store` | The backing store failed or is unreachable | Check the store connection and key types |
//! | `Decode` | Stored bytes don't decode to the requested type | Read the key with the accessor matching what was stored |
//! | `Configuration` | Invalid connection settings, caught before any I/O | Check `RECALL_REDIS_URL` and the connect timeout |
//! | `Generic` | Errors raised by wrapped operations | Check the specific error message |
//!
//! A missing key is never an error: accessors return `Ok(None)` for it.
//!
//! ## 🔗 Store Error Integration
//!
//! `RecallError` converts `StoreError` instances automatically, so store calls
//! propagate with `?`:
//!
//! ```rust
//! use recall::{RecallResult, store::{KeyValueStore, MemoryStore}};
//!
//! async fn example_function(store: &MemoryStore) -> RecallResult<Option<Vec<u8>>> {
//!     // StoreError is automatically converted to RecallError::Store
//!     let value = store.get("key").await?;
//!     Ok(value)
//! }
//! ```

use crate::store::error::StoreError;

/// Error type for cache, instrumentation and replay operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecallError {
    /// Error in store operations (set/get/incr/rpush/lrange/flush)
    ///
    /// Connectivity failures land here too. Nothing in this crate retries them.
    Store(String),

    /// Stored bytes could not be decoded into the requested type
    ///
    /// Raised by `get_as_string`, `get_as_integer`, `get_as_float`, custom
    /// decode functions and unreadable history records.
    Decode(String),

    /// Invalid configuration
    ///
    /// Raised by `RedisConfig::validate` for an empty or unsupported URL or a
    /// zero connect timeout.
    Configuration(String),

    /// General-purpose error for other scenarios
    ///
    /// Wrapped operations use this for their own failures.
    Generic(String),
}

impl RecallError {
    /// Create a new store error
    pub fn store<S: Into<String>>(msg: S) -> Self {
        RecallError::Store(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        RecallError::Decode(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        RecallError::Configuration(msg.into())
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        RecallError::Generic(msg.into())
    }

    /// Get the error message as a string slice
    pub fn message(&self) -> &str {
        match self {
            RecallError::Store(msg) => msg,
            RecallError::Decode(msg) => msg,
            RecallError::Configuration(msg) => msg,
            RecallError::Generic(msg) => msg,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            RecallError::Store(_) => "store",
            RecallError::Decode(_) => "decode",
            RecallError::Configuration(_) => "configuration",
            RecallError::Generic(_) => "generic",
        }
    }
}

impl std::fmt::Display for RecallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecallError::Store(msg) => write!(f, "Store error: {msg}"),
            RecallError::Decode(msg) => write!(f, "Decode error: {msg}"),
            RecallError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            RecallError::Generic(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for RecallError {}

impl From<&str> for RecallError {
    fn from(err: &str) -> Self {
        RecallError::Generic(err.to_string())
    }
}

impl From<String> for RecallError {
    fn from(err: String) -> Self {
        RecallError::Generic(err)
    }
}

impl From<StoreError> for RecallError {
    fn from(err: StoreError) -> Self {
        RecallError::store(err.to_string())
    }
}

impl From<serde_json::Error> for RecallError {
    fn from(err: serde_json::Error) -> Self {
        RecallError::decode(format!("malformed call record: {err}"))
    }
}

/// Convenient Result type alias for cache operations
pub type RecallResult<T> = Result<T, RecallError>;
