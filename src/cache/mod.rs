//! Cache Module
//!
//! Request-scoped response caching: a shared TTL store plus a wrapper that
//! memoizes successful handler results.

mod entry;
mod key;
mod outcome;
mod stats;
mod store;
mod wrapper;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{default_key, KeyGenerator, RequestContext, DEFAULT_KEY_PREFIX};
pub use outcome::Outcome;
pub use stats::{CacheStats, StatsCounters};
pub use store::CacheStore;
pub use wrapper::{CacheOptions, CachedHandler, ResponseCache, DEFAULT_TTL_MS};
