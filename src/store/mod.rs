//! # Key-Value Store Backends
//!
//! This module defines the [`KeyValueStore`] contract the cache is built on,
//! plus the backends that implement it.
//!
//! ## 🎯 Purpose
//!
//! The cache and its instrumentation only need six primitives from a store:
//! - `set` / `get` for the stored entries
//! - `incr` for call counters
//! - `rpush` / `lrange` for the input and output history lists
//! - `flush_all` for the reset performed when a cache is constructed
//!
//! Anything that can provide these atomically per key can back a [`crate::Cache`].
//!
//! ## 🔧 Available Backends
//!
//! ### MemoryStore (Included)
//!
//! A thread-safe, in-process store ready for immediate use. It follows Redis'
//! typing rules so code tested against it behaves the same against a server.
//!
//! ### RedisStore (feature `redis`)
//!
//! A multiplexed tokio connection to a Redis server. Connection lifecycle,
//! timeouts and retries belong to this backend, not to the cache.
//!
//! ## 🔒 Atomicity
//!
//! Every primitive must be atomic for the key it touches. Two concurrent
//! `rpush` calls on the same list must both land; two concurrent `incr` calls
//! must both count. The cache relies on this and adds no locking of its own.

pub mod error;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;
pub mod value;

use async_trait::async_trait;

/// Type alias for store operation results
pub type StoreResult<T> = Result<T, error::StoreError>;

/// Core key-value store trait
///
/// ## 📋 Method Reference
///
/// | Method | Purpose | Redis equivalent |
/// |--------|---------|------------------|
/// | `set` | Overwrite the value at a key | `SET` |
/// | `get` | Read raw bytes, `None` if absent | `GET` |
/// | `incr` | Atomic +1, creating the key at 1 | `INCR` |
/// | `rpush` | Append to the end of a list | `RPUSH` |
/// | `lrange` | Read a slice of a list | `LRANGE` |
/// | `flush_all` | Drop every key | `FLUSHDB` |
///
/// ## Thread Safety Requirements
///
/// All implementations must be `Send + Sync` and every method takes `&self`,
/// so backends use interior mutability or a multiplexed connection.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, replacing whatever was there
    async fn set(&self, key: &str, value: StoreValue) -> StoreResult<()>;

    /// Get the raw bytes stored under `key`
    ///
    /// A missing key is not an error and returns `Ok(None)`.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Increment the integer at `key` by one and return the new value
    ///
    /// A missing key is created with the value 1.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Append `value` to the end of the list at `key`
    ///
    /// Creates the list if it doesn't exist. Returns the list length after the push.
    async fn rpush(&self, key: &str, value: &str) -> StoreResult<usize>;

    /// Read the elements of the list at `key` between `start` and `stop`, inclusive
    ///
    /// Negative indices count from the end, so `lrange(key, 0, -1)` returns the
    /// whole list. A missing key reads as an empty list.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>>;

    /// Remove every key from the store
    async fn flush_all(&self) -> StoreResult<()>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    async fn set(&self, key: &str, value: StoreValue) -> StoreResult<()> {
        (**self).set(key, value).await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        (**self).incr(key).await
    }

    async fn rpush(&self, key: &str, value: &str) -> StoreResult<usize> {
        (**self).rpush(key, value).await
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        (**self).lrange(key, start, stop).await
    }

    async fn flush_all(&self) -> StoreResult<()> {
        (**self).flush_all().await
    }
}

/// Resolve Redis-style inclusive `start..=stop` indices against a list of `len` items
///
/// Returns `None` when the range selects nothing.
pub(crate) fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisStore};
pub use value::StoreValue;
