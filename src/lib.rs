//! # Recall: Instrumented Key-Value Cache
//!
//! Recall stores scalar values in a key-value store under random keys, counts
//! and records every `store` call as it happens, and rebuilds a readable call
//! trace from that record on demand.
//!
//! ## 🚀 Quick Start
//!
//! Build a [`Cache`] over a store (this flushes the store), call `store` and
//! the typed getters, then ask for a replay of what happened.
//!
//! ```rust
//! use recall::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> RecallResult<()> {
//! let cache = Cache::new(MemoryStore::new()).await?;
//! let k1 = cache.store("foo").await?;
//! let k2 = cache.store(42).await?;
//!
//! assert_eq!(cache.get_as_integer(&k2).await?, Some(42));
//!
//! let trace = replay(cache.backend(), cache.store_identity()).await?;
//! assert_eq!(trace.lines()[1], format!("Cache.store(*('foo',)) -> {k1}"));
//! # Ok(())
//! # }
//! ```
//!
//! ## 🎯 Core Concepts
//!
//! ### Stores - Where Everything Lives
//!
//! A [`KeyValueStore`] provides `set`, `get`, `incr`, `rpush`, `lrange` and
//! `flush_all`. [`MemoryStore`] runs in-process; `RedisStore` (feature `redis`)
//! talks to a Redis server.
//!
//! ### Instrumentation - Side Effects Without Changing Results
//!
//! [`CountCalls`] and [`RecordHistory`] wrap any [`Operation`]. They compose by
//! explicit chaining through [`OperationExt`]; the cache uses
//! `StoreData::new("Cache.store").recorded().counted()`.
//!
//! ### Replay - Reading the Record Back
//!
//! [`replay`] takes a store handle and an [`OperationIdentity`] and returns a
//! [`Trace`], which renders as the familiar
//! `Cache.store was called 2 times:` block.
//!
//! ## 📚 Module Overview
//!
//! - **[`cache`]**: The [`Cache`] façade and [`CacheConfig`]
//! - **[`instrument`]**: Operations, identities and the two wrappers
//! - **[`replay`]**: [`Trace`] reconstruction
//! - **[`store`]**: The [`KeyValueStore`] trait and its backends
//! - **[`error`]**: [`RecallError`] and [`RecallResult`]
//!
//! ## Cargo Features
//!
//! - `tracing` (default): spans and events through the `tracing` crate
//! - `redis`: the Redis backend

pub mod cache;
pub mod error;
pub mod instrument;
pub mod replay;
pub mod store;

pub use cache::{Cache, CacheConfig, STORE_IDENTITY, StoreData};
pub use error::{RecallError, RecallResult};
pub use instrument::{
    CallOutcome, CallRecord, CountCalls, HistoryLayout, Operation, OperationExt,
    OperationIdentity, RecordHistory,
};
pub use replay::{Trace, TraceEntry, replay, replay_with_layout};
#[cfg(feature = "redis")]
pub use store::{RedisConfig, RedisStore};
pub use store::{KeyValueStore, MemoryStore, StoreError, StoreValue};

pub mod prelude {
    //! Simplified imports for common usage patterns
    //!
    //! Use `use recall::prelude::*;` to import the most commonly used types and traits.

    pub use crate::{
        Cache, CacheConfig, HistoryLayout, KeyValueStore, MemoryStore, Operation, OperationExt,
        OperationIdentity, RecallError, RecallResult, StoreValue, Trace, replay,
    };

    #[cfg(feature = "redis")]
    pub use crate::{RedisConfig, RedisStore};

    // Re-export async_trait for implementing `Operation` and `KeyValueStore`
    pub use async_trait::async_trait;
}
