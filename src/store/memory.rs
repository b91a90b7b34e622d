use super::{KeyValueStore, StoreResult, StoreValue, error::StoreError, resolve_range};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A value held by [`MemoryStore`]
#[derive(Debug, Clone)]
enum Entry {
    Bytes(Vec<u8>),
    List(Vec<String>),
}

/// Thread-safe in-memory HashMap-based store
///
/// `MemoryStore` keeps its data in a `HashMap` wrapped in `Arc<RwLock<_>>`.
/// Every primitive takes the lock once, so each operation is atomic for the
/// key it touches.
///
/// ## Thread Safety
///
/// Multiple readers can access the store concurrently, while writers get exclusive access.
/// Clones share the same data, which is how a cache and a replay reader see
/// the same keyspace.
///
/// ## Typing
///
/// Keys hold either bytes or a list. Mixing them fails with
/// [`StoreError::WrongType`], the way a Redis server answers `WRONGTYPE`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    /// Internal HashMap storing the entries, wrapped in Arc<RwLock<_>> for thread safety
    data: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    /// Create a new empty MemoryStore instance
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of keys currently stored
    pub fn len(&self) -> StoreResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|_| StoreError::lock_error("Failed to acquire read lock on store"))?;

        Ok(data.len())
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|len| len == 0)
    }

    /// Snapshot of all keys, in no particular order
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let data = self
            .data
            .read()
            .map_err(|_| StoreError::lock_error("Failed to acquire read lock on store"))?;

        Ok(data.keys().cloned().collect())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: StoreValue) -> StoreResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| StoreError::lock_error("Failed to acquire write lock on store"))?;

        data.insert(key.to_string(), Entry::Bytes(value.to_bytes()));
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let data = self
            .data
            .read()
            .map_err(|_| StoreError::lock_error("Failed to acquire read lock on store"))?;

        match data.get(key) {
            Some(Entry::Bytes(bytes)) => Ok(Some(bytes.clone())),
            Some(Entry::List(_)) => Err(StoreError::wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut data = self
            .data
            .write()
            .map_err(|_| StoreError::lock_error("Failed to acquire write lock on store"))?;

        let current = match data.get(key) {
            Some(Entry::Bytes(bytes)) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|text| text.parse::<i64>().ok())
                .ok_or_else(|| StoreError::command("value is not an integer or out of range"))?,
            Some(Entry::List(_)) => return Err(StoreError::wrong_type(key)),
            None => 0,
        };

        let next = current
            .checked_add(1)
            .ok_or_else(|| StoreError::command("increment or decrement would overflow"))?;
        data.insert(key.to_string(), Entry::Bytes(next.to_string().into_bytes()));
        Ok(next)
    }

    async fn rpush(&self, key: &str, value: &str) -> StoreResult<usize> {
        let mut data = self
            .data
            .write()
            .map_err(|_| StoreError::lock_error("Failed to acquire write lock on store"))?;

        match data
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(Vec::new()))
        {
            Entry::List(items) => {
                items.push(value.to_string());
                Ok(items.len())
            }
            Entry::Bytes(_) => Err(StoreError::wrong_type(key)),
        }
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let data = self
            .data
            .read()
            .map_err(|_| StoreError::lock_error("Failed to acquire read lock on store"))?;

        match data.get(key) {
            Some(Entry::List(items)) => Ok(resolve_range(items.len(), start, stop)
                .map(|(from, to)| items[from..=to].to_vec())
                .unwrap_or_default()),
            Some(Entry::Bytes(_)) => Err(StoreError::wrong_type(key)),
            None => Ok(Vec::new()),
        }
    }

    async fn flush_all(&self) -> StoreResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| StoreError::lock_error("Failed to acquire write lock on store"))?;

        data.clear();
        Ok(())
    }
}
