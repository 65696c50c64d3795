//! Cache Entry Module
//!
//! Defines a stored handler result stamped with its storage time.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A cached handler result together with the moment it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The cached payload
    pub value: V,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: V) -> Self {
        Self {
            value,
            stored_at: current_timestamp_ms(),
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.stored_at)
    }

    // == Is Fresh ==
    /// Checks whether the entry is still valid for the given TTL.
    ///
    /// Boundary condition: the comparison is strict, so an entry whose age
    /// equals the TTL is stale. A TTL of 0 therefore never yields a fresh
    /// entry.
    pub fn is_fresh(&self, ttl_ms: u64) -> bool {
        self.age_ms() < ttl_ms
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0 rather than panicking.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
