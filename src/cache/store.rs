//! Cache Store Module
//!
//! Plain key-to-entry mapping. Freshness is never evaluated here; callers
//! decide whether an entry is still usable.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CacheStats, StatsCounters};

// == Cache Store ==
/// Unbounded storage of handler results keyed by cache key.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-entry storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Effectiveness counters, maintained by the caching wrapper
    stats: StatsCounters,
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            stats: StatsCounters::new(),
        }
    }

    // == Get ==
    /// Returns the entry for `key` verbatim, stale or not.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Set ==
    /// Creates or overwrites the entry for `key`, stamped with the current time.
    pub fn set(&mut self, key: String, value: V) {
        self.entries.insert(key, CacheEntry::new(value));
    }

    // == Has ==
    /// Existence check, ignoring staleness.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Purge Older Than ==
    /// Removes entries whose age is at least `max_age_ms`.
    ///
    /// Returns the number of entries removed.
    pub fn purge_older_than(&mut self, max_age_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(max_age_ms));
        before - self.entries.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    /// Counters for the caching wrapper; updating them needs no write lock.
    pub(crate) fn counters(&self) -> &StatsCounters {
        &self.stats
    }

    // == Length ==
    /// Returns the number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
