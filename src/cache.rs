//! # Cache - Instrumented Storage Façade
//!
//! [`Cache`] stores scalar values under freshly minted random keys and reads
//! them back through typed accessors. Every `store` call is counted and its
//! input and output are recorded under the identity `"Cache.store"`, so the
//! history can later be rebuilt with [`Cache::replay`] or [`crate::replay::replay`].
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use recall::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> RecallResult<()> {
//! let cache = Cache::new(MemoryStore::new()).await?;
//!
//! let key = cache.store("foo").await?;
//! assert_eq!(cache.get_as_string(&key).await?, Some("foo".to_string()));
//!
//! let trace = cache.replay(cache.store_identity()).await?;
//! assert_eq!(trace.call_count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## ⚠️ Construction Flushes the Store
//!
//! Building a cache empties the whole backing store, including keys written by
//! anything else. A cache assumes it owns the keyspace from that point on.

use crate::error::{RecallError, RecallResult};
use crate::instrument::{
    CountCalls, HistoryLayout, Operation, OperationExt, OperationIdentity, RecordHistory,
};
use crate::replay::{Trace, replay_with_layout};
use crate::store::{KeyValueStore, MemoryStore, StoreValue};
use async_trait::async_trait;
use rand::Rng;
use std::future::Future;

#[cfg(feature = "tracing")]
use tracing::{Instrument, debug, info, instrument};

/// Identity under which [`Cache::store`] calls are counted and recorded
pub const STORE_IDENTITY: &str = "Cache.store";

/// Generate a fresh entry key
///
/// 128 random bits laid out as a version 4 UUID, e.g. `"0f8fad5b-d9cb-469f-a165-70867728950e"`.
pub fn generate_key() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string()
}

/// The uninstrumented store operation: write one value under a new key
#[derive(Debug, Clone)]
pub struct StoreData {
    identity: OperationIdentity,
}

impl StoreData {
    pub fn new<I: Into<OperationIdentity>>(identity: I) -> Self {
        Self {
            identity: identity.into(),
        }
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> Operation<S> for StoreData {
    type Input = (StoreValue,);
    type Output = String;

    fn identity(&self) -> &OperationIdentity {
        &self.identity
    }

    async fn call(&self, store: &S, input: Self::Input) -> RecallResult<String> {
        let (data,) = input;
        let key = generate_key();

        #[cfg(feature = "tracing")]
        debug!(key = %key, kind = data.kind(), "Storing value");

        store.set(&key, data).await?;
        Ok(key)
    }
}

/// Cache configuration
///
/// ```rust
/// use recall::{CacheConfig, HistoryLayout};
///
/// let config = CacheConfig::new().with_history_layout(HistoryLayout::Combined);
/// assert_eq!(config.history_layout, HistoryLayout::Combined);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Layout used to record `store` history and to replay it
    pub history_layout: HistoryLayout,
    /// Span every cache operation runs inside
    #[cfg(feature = "tracing")]
    pub tracing_span: Option<tracing::Span>,
}

impl CacheConfig {
    /// Create a new CacheConfig with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history layout
    pub fn with_history_layout(mut self, layout: HistoryLayout) -> Self {
        self.history_layout = layout;
        self
    }

    /// Run every cache operation inside `span`
    #[cfg(feature = "tracing")]
    pub fn with_tracing_span(mut self, span: tracing::Span) -> Self {
        self.tracing_span = Some(span);
        self
    }
}

type InstrumentedStore = CountCalls<RecordHistory<StoreData>>;

/// Instrumented key-value cache
///
/// Generic over the backing [`KeyValueStore`]; defaults to [`MemoryStore`].
/// All methods take `&self`, so a cache can be shared across tasks behind an
/// `Arc` as long as the backend's primitives are atomic.
pub struct Cache<S = MemoryStore>
where
    S: KeyValueStore,
{
    store: S,
    store_op: InstrumentedStore,
    identity: OperationIdentity,
    config: CacheConfig,
}

impl<S: KeyValueStore> Cache<S> {
    /// Create a cache over `store` with the default configuration
    ///
    /// Flushes the store.
    pub async fn new(store: S) -> RecallResult<Self> {
        Self::with_config(store, CacheConfig::default()).await
    }

    /// Create a cache over `store` with `config`
    ///
    /// Flushes the store.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub async fn with_config(store: S, config: CacheConfig) -> RecallResult<Self> {
        store.flush_all().await?;

        #[cfg(feature = "tracing")]
        info!(layout = ?config.history_layout, "Cache ready, store flushed");

        let identity = OperationIdentity::new(STORE_IDENTITY);
        let store_op = StoreData::new(identity.clone())
            .recorded_with(config.history_layout)
            .counted();

        Ok(Self {
            store,
            store_op,
            identity,
            config,
        })
    }

    async fn in_span<F: Future>(&self, fut: F) -> F::Output {
        #[cfg(feature = "tracing")]
        if let Some(span) = &self.config.tracing_span {
            return fut.instrument(span.clone()).await;
        }
        fut.await
    }

    /// Store `data` under a new random key and return the key
    ///
    /// Counted and recorded under [`STORE_IDENTITY`]: one `INCR`, one input
    /// push, one `SET` and one output push per call.
    pub async fn store<V: Into<StoreValue>>(&self, data: V) -> RecallResult<String> {
        let input = (data.into(),);
        self.in_span(self.store_op.call(&self.store, input)).await
    }

    /// Raw bytes stored under `key`, `None` if the key is absent
    pub async fn get(&self, key: &str) -> RecallResult<Option<Vec<u8>>> {
        Ok(self.in_span(self.store.get(key)).await?)
    }

    /// Read `key` and convert the raw bytes with `decode`
    ///
    /// `decode` only runs when the key is present. Its errors are returned as-is.
    pub async fn get_with<T, F>(&self, key: &str, decode: F) -> RecallResult<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> RecallResult<T> + Send,
    {
        self.get(key).await?.map(decode).transpose()
    }

    /// Read `key` as UTF-8 text
    pub async fn get_as_string(&self, key: &str) -> RecallResult<Option<String>> {
        self.get_with(key, |bytes| {
            String::from_utf8(bytes).map_err(|e| {
                RecallError::decode(format!("value at '{key}' is not valid UTF-8: {e}"))
            })
        })
        .await
    }

    /// Read `key` as a decimal integer
    pub async fn get_as_integer(&self, key: &str) -> RecallResult<Option<i64>> {
        self.get_with(key, |bytes| parse_text(key, &bytes, "an integer"))
            .await
    }

    /// Read `key` as a floating-point number
    pub async fn get_as_float(&self, key: &str) -> RecallResult<Option<f64>> {
        self.get_with(key, |bytes| parse_text(key, &bytes, "a float"))
            .await
    }

    /// Read `key` as raw bytes; same as [`Cache::get`]
    pub async fn get_as_bytes(&self, key: &str) -> RecallResult<Option<Vec<u8>>> {
        self.get(key).await
    }

    /// Identity under which `store` calls are recorded
    pub fn store_identity(&self) -> &OperationIdentity {
        &self.identity
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The backing store, for replaying or inspecting recorded history
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Replay the recorded history of `identity` using the layout this cache records with
    pub async fn replay(&self, identity: &OperationIdentity) -> RecallResult<Trace> {
        let layout = self.store_op.inner().layout();
        self.in_span(replay_with_layout(&self.store, identity, layout))
            .await
    }
}

fn parse_text<T>(key: &str, bytes: &[u8], what: &str) -> RecallResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let text = std::str::from_utf8(bytes)
        .map_err(|e| RecallError::decode(format!("value at '{key}' is not valid UTF-8: {e}")))?;
    text.parse::<T>()
        .map_err(|e| RecallError::decode(format!("value at '{key}' is not {what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::test_support::CommandLog;
    use crate::instrument::{CallOutcome, HistoryLayout};
    use crate::replay::replay;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    async fn cache() -> Cache {
        Cache::new(MemoryStore::new()).await.unwrap()
    }

    #[test]
    fn test_generate_key_shape() {
        let key = generate_key();
        let parsed = uuid::Uuid::parse_str(&key).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(key.len(), 36);
    }

    #[tokio::test]
    async fn test_store_and_get_round_trip() {
        let cache = cache().await;

        let k1 = cache.store("foo").await.unwrap();
        assert_eq!(cache.get_as_string(&k1).await.unwrap(), Some("foo".to_string()));

        let k2 = cache.store(42).await.unwrap();
        assert_ne!(k1, k2);
        assert_eq!(cache.get_as_integer(&k2).await.unwrap(), Some(42));

        let k3 = cache.store(2.5).await.unwrap();
        assert_eq!(cache.get_as_float(&k3).await.unwrap(), Some(2.5));

        let k4 = cache.store(vec![0u8, 159, 146, 150]).await.unwrap();
        assert_eq!(
            cache.get_as_bytes(&k4).await.unwrap(),
            Some(vec![0u8, 159, 146, 150])
        );
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let cache = cache().await;
        assert_eq!(cache.get("missing").await.unwrap(), None);
        assert_eq!(cache.get_as_string("missing").await.unwrap(), None);
        assert_eq!(cache.get_as_integer("missing").await.unwrap(), None);
        assert_eq!(cache.get_as_float("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_with_custom_decode() {
        let cache = cache().await;
        let key = cache.store("a,b,c").await.unwrap();

        let parts = cache
            .get_with(&key, |bytes| {
                Ok(String::from_utf8_lossy(&bytes)
                    .split(',')
                    .map(str::to_string)
                    .collect::<Vec<_>>())
            })
            .await
            .unwrap();
        assert_eq!(parts, Some(vec!["a".to_string(), "b".into(), "c".into()]));
    }

    #[tokio::test]
    async fn test_custom_decode_error_propagates() {
        let cache = cache().await;
        let key = cache.store("payload").await.unwrap();

        let err = cache
            .get_with(&key, |_| -> RecallResult<()> {
                Err(RecallError::decode("unsupported format"))
            })
            .await
            .unwrap_err();
        assert_eq!(err, RecallError::decode("unsupported format"));
    }

    #[tokio::test]
    async fn test_get_as_integer_rejects_text() {
        let cache = cache().await;
        let key = cache.store("forty-two").await.unwrap();

        let err = cache.get_as_integer(&key).await.unwrap_err();
        assert_eq!(err.category(), "decode");
        assert!(err.message().contains("is not an integer"));
    }

    #[tokio::test]
    async fn test_get_as_float_rejects_text() {
        let cache = cache().await;
        let key = cache.store("three and a half").await.unwrap();

        let err = cache.get_as_float(&key).await.unwrap_err();
        assert_eq!(err.category(), "decode");
        assert!(err.message().contains("is not a float"));
    }

    #[tokio::test]
    async fn test_get_as_float_reads_exponent_form() {
        let cache = cache().await;
        let key = cache.store(1e16).await.unwrap();

        assert_eq!(cache.get(&key).await.unwrap(), Some(b"1e+16".to_vec()));
        assert_eq!(cache.get_as_float(&key).await.unwrap(), Some(1e16));
    }

    #[tokio::test]
    async fn test_get_as_string_rejects_invalid_utf8() {
        let cache = cache().await;
        let key = cache.store(vec![0xffu8, 0xfe]).await.unwrap();

        let err = cache.get_as_string(&key).await.unwrap_err();
        assert_eq!(err.category(), "decode");
    }

    #[tokio::test]
    async fn test_construction_flushes_store() {
        let store = MemoryStore::new();
        let first = Cache::new(store.clone()).await.unwrap();
        let key = first.store("old").await.unwrap();

        let second = Cache::new(store.clone()).await.unwrap();
        assert_eq!(second.get(&key).await.unwrap(), None);
        assert_eq!(second.replay(second.store_identity()).await.unwrap().call_count, 0);
    }

    #[tokio::test]
    async fn test_construction_flushes_unrelated_keys() {
        let store = MemoryStore::new();
        store.set("someone_else", "data".into()).await.unwrap();

        let _cache = Cache::new(store.clone()).await.unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_store_command_order() {
        let cache = Cache::new(CommandLog::new(MemoryStore::new())).await.unwrap();
        let key = cache.store("foo").await.unwrap();

        assert_eq!(
            cache.backend().commands(),
            vec![
                "FLUSHDB".to_string(),
                "INCR Cache.store".to_string(),
                "RPUSH Cache.store:inputs".to_string(),
                format!("SET {key}"),
                "RPUSH Cache.store:outputs".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_replay_scenario() {
        let cache = cache().await;
        let k1 = cache.store("foo").await.unwrap();
        assert_eq!(cache.get_as_string(&k1).await.unwrap(), Some("foo".to_string()));
        let k2 = cache.store(42).await.unwrap();
        assert_eq!(cache.get_as_integer(&k2).await.unwrap(), Some(42));

        let trace = replay(cache.backend(), &OperationIdentity::new("Cache.store"))
            .await
            .unwrap();
        assert_eq!(
            trace.to_string(),
            format!(
                "Cache.store was called 2 times:\n\
                 Cache.store(*('foo',)) -> {k1}\n\
                 Cache.store(*(42,)) -> {k2}"
            )
        );
    }

    #[tokio::test]
    async fn test_counter_and_history_lengths() {
        let cache = cache().await;
        let mut keys = Vec::new();
        for i in 0..10 {
            keys.push(cache.store(i).await.unwrap());
        }

        let store = cache.backend();
        assert_eq!(store.get("Cache.store").await.unwrap(), Some(b"10".to_vec()));
        let inputs = store.lrange("Cache.store:inputs", 0, -1).await.unwrap();
        let outputs = store.lrange("Cache.store:outputs", 0, -1).await.unwrap();
        assert_eq!(inputs.len(), 10);
        assert_eq!(outputs, keys);
        assert_eq!(inputs[3], "(3,)");
    }

    #[tokio::test]
    async fn test_combined_layout_replay() {
        let config = CacheConfig::new().with_history_layout(HistoryLayout::Combined);
        let cache = Cache::with_config(MemoryStore::new(), config).await.unwrap();
        let key = cache.store("bar").await.unwrap();

        let trace = cache.replay(cache.store_identity()).await.unwrap();
        assert_eq!(trace.call_count, 1);
        assert_eq!(trace.entries[0].input, "('bar',)");
        assert_eq!(trace.entries[0].outcome, CallOutcome::Returned(key));
        assert!(
            cache
                .backend()
                .lrange("Cache.store:inputs", 0, -1)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_store_combined_layout() {
        let config = CacheConfig::new().with_history_layout(HistoryLayout::Combined);
        let cache = Arc::new(Cache::with_config(MemoryStore::new(), config).await.unwrap());
        let mut handles = vec![];

        for task_id in 0..8i64 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let mut stored = Vec::new();
                for i in 0..20i64 {
                    let value = task_id * 100 + i;
                    stored.push((value, cache.store(value).await.unwrap()));
                }
                stored
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }

        let trace = cache.replay(cache.store_identity()).await.unwrap();
        assert_eq!(trace.call_count, 160);
        assert_eq!(trace.entries.len(), 160);

        for (value, key) in all {
            assert_eq!(input_for_key(&trace, &key), Some(format!("({value},)")));
        }
    }

    fn input_for_key(trace: &Trace, key: &str) -> Option<String> {
        trace
            .entries
            .iter()
            .find(|entry| entry.outcome == CallOutcome::Returned(key.to_string()))
            .map(|entry| entry.input.clone())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_store_counts_every_call() {
        let cache = Arc::new(cache().await);
        let mut handles = vec![];

        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    cache.store(i).await.unwrap();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        let trace = cache.replay(cache.store_identity()).await.unwrap();
        assert_eq!(trace.call_count, 200);
        assert_eq!(trace.entries.len(), 200);
    }

    #[cfg(feature = "tracing")]
    #[tokio::test]
    async fn test_cache_with_tracing_span() {
        let span = tracing::info_span!("test_cache", test_id = "cache_span_test");
        let config = CacheConfig::new().with_tracing_span(span);
        let cache = Cache::with_config(MemoryStore::new(), config).await.unwrap();

        let key = cache.store("traced").await.unwrap();
        assert_eq!(cache.get_as_string(&key).await.unwrap(), Some("traced".to_string()));
        assert!(cache.config().tracing_span.is_some());
    }

    fn block_on<F: Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut)
    }

    proptest! {
        #[test]
        fn prop_store_keys_are_distinct(count in 1usize..64) {
            let keys = block_on(async {
                let cache = cache().await;
                let mut keys = Vec::with_capacity(count);
                for i in 0..count {
                    keys.push(cache.store(i as i64).await.unwrap());
                }
                keys
            });
            let unique: HashSet<_> = keys.iter().collect();
            prop_assert_eq!(unique.len(), count);
        }

        #[test]
        fn prop_text_round_trip(text in ".*") {
            let read = block_on(async {
                let cache = cache().await;
                let key = cache.store(text.as_str()).await.unwrap();
                cache.get_as_string(&key).await.unwrap()
            });
            prop_assert_eq!(read, Some(text));
        }

        #[test]
        fn prop_integer_round_trip(value in any::<i64>()) {
            let read = block_on(async {
                let cache = cache().await;
                let key = cache.store(value).await.unwrap();
                cache.get_as_integer(&key).await.unwrap()
            });
            prop_assert_eq!(read, Some(value));
        }

        #[test]
        fn prop_counter_matches_calls(calls in 0usize..40) {
            let (count, inputs, entries) = block_on(async {
                let cache = cache().await;
                for i in 0..calls {
                    cache.store(format!("value-{i}")).await.unwrap();
                }
                let trace = cache.replay(cache.store_identity()).await.unwrap();
                let inputs = cache.backend().lrange("Cache.store:inputs", 0, -1).await.unwrap();
                (trace.call_count, inputs.len(), trace.entries.len())
            });
            prop_assert_eq!(count, calls as i64);
            prop_assert_eq!(inputs, calls);
            prop_assert_eq!(entries, calls);
        }
    }
}
