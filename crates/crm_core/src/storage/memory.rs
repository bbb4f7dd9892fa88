//! In-process key/value store.

use super::{KeyValueStore, StorageResult};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    writes: u64,
}

/// Map-backed store whose clones share the same contents.
///
/// Keeping a clone lets callers reopen a store over the same data or inspect
/// what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`. Not counted as writes.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store.lock().entries.extend(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        store
    }

    /// Number of successful `set` calls across all clones.
    pub fn writes(&self) -> u64 {
        self.lock().writes
    }

    /// Returns the raw value under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    /// Returns all stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave the map half-written.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let mut inner = self.lock();
        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}
