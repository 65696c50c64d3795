//! Caching Wrapper
//!
//! [`ResponseCache`] is the shared handle to one [`CacheStore`]. Wrapping a
//! handler with it yields a [`CachedHandler`] that answers from fresh
//! entries and stores successful results.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, CacheStore, KeyGenerator, Outcome, RequestContext};

/// Default time-to-live of a cached result (5 minutes).
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;

// == Cache Options ==
/// Per-handler caching policy.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// How long an entry stays valid after it was stored
    pub ttl_ms: u64,
    /// Derives the cache key from the request
    pub key_generator: KeyGenerator,
    /// Serialise concurrent misses for the same key
    pub single_flight: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            key_generator: KeyGenerator::default(),
            single_flight: false,
        }
    }
}

impl CacheOptions {
    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn with_key_generator<F>(mut self, generate: F) -> Self
    where
        F: Fn(&RequestContext) -> String + Send + Sync + 'static,
    {
        self.key_generator = KeyGenerator::new(generate);
        self
    }

    /// When enabled, concurrent misses for one key wait for the first
    /// invocation and then re-read the store instead of all calling the
    /// handler.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }
}

// == Response Cache ==
/// Cloneable handle to a shared cache store.
///
/// Every clone refers to the same entries. Clearing it at any time only
/// costs performance: wrapped handlers simply run again.
#[derive(Debug)]
pub struct ResponseCache<V = serde_json::Value> {
    store: Arc<RwLock<CacheStore<V>>>,
}

impl<V> Clone for ResponseCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<V> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResponseCache<V> {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new())),
        }
    }

    /// Wraps `handler` so its successful results are cached under `options`.
    pub fn wrap<H, Fut, E>(&self, options: CacheOptions, handler: H) -> CachedHandler<H, V>
    where
        H: Fn(RequestContext) -> Fut,
        Fut: Future<Output = Result<Outcome<V>, E>>,
    {
        CachedHandler {
            handler,
            cache: self.clone(),
            options,
            in_flight: Arc::new(SyncMutex::new(HashMap::new())),
        }
    }

    // == Administrative Operations ==

    /// Removes every entry. Returns how many were dropped.
    pub async fn clear_all(&self) -> usize {
        self.store.write().await.clear()
    }

    /// Removes one entry. Returns `true` iff it was present.
    pub async fn clear_key(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    /// Number of stored entries, stale ones included.
    pub async fn size(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn has(&self, key: &str) -> bool {
        self.store.read().await.has(key)
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Drops entries at least `max_age_ms` old. Returns how many were removed.
    pub async fn purge_older_than(&self, max_age_ms: u64) -> usize {
        self.store.write().await.purge_older_than(max_age_ms)
    }
}

impl<V: Clone> ResponseCache<V> {
    /// Returns a copy of the entry for `key`, stale or not.
    pub async fn get_entry(&self, key: &str) -> Option<CacheEntry<V>> {
        self.store.read().await.get(key).cloned()
    }
}

// == Cached Handler ==
/// Per-key locks for single-flight misses.
type InFlight = Arc<SyncMutex<HashMap<String, Arc<Mutex<()>>>>>;

/// A handler decorated with response caching.
pub struct CachedHandler<H, V> {
    handler: H,
    cache: ResponseCache<V>,
    options: CacheOptions,
    in_flight: InFlight,
}

impl<H, Fut, V, E> CachedHandler<H, V>
where
    H: Fn(RequestContext) -> Fut,
    Fut: Future<Output = Result<Outcome<V>, E>>,
    V: Clone,
{
    /// Serves `request` from a fresh entry, or runs the handler.
    ///
    /// Handler errors are returned untouched and nothing is stored for
    /// them. A `Failure` outcome is returned but not stored either.
    pub async fn call(&self, request: RequestContext) -> Result<Outcome<V>, E> {
        let key = self.options.key_generator.generate(&request);

        if let Some(value) = self.lookup(&key).await {
            return Ok(Outcome::Success(value));
        }

        if !self.options.single_flight {
            return self.invoke(key, request).await;
        }

        let slot = SlotGuard::acquire(&self.in_flight, &key);
        let _lock = Arc::clone(&slot.slot).lock_owned().await;

        // Whoever held the slot before us may have filled the entry
        match self.lookup(&key).await {
            Some(value) => Ok(Outcome::Success(value)),
            None => self.invoke(key, request).await,
        }
    }

    async fn lookup(&self, key: &str) -> Option<V> {
        let store = self.cache.store.read().await;
        let value = store
            .get(key)
            .filter(|entry| entry.is_fresh(self.options.ttl_ms))
            .map(|entry| entry.value.clone())?;

        store.counters().record_hit();
        debug!(cache_key = %key, "Cache hit");
        Some(value)
    }

    async fn invoke(&self, key: String, request: RequestContext) -> Result<Outcome<V>, E> {
        self.cache.store.read().await.counters().record_miss();

        let outcome = (self.handler)(request).await?;

        if let Outcome::Success(value) = &outcome {
            let mut store = self.cache.store.write().await;
            store.set(key.clone(), value.clone());
            store.counters().record_store();
            debug!(cache_key = %key, "Cache miss - stored result");
        }

        Ok(outcome)
    }
}

// == Slot Guard ==
/// Registration of one caller in the in-flight map.
///
/// Dropping it, including when the caller's future is cancelled, removes
/// the key's slot once no other caller holds or waits on it.
struct SlotGuard {
    key: String,
    slot: Arc<Mutex<()>>,
    in_flight: InFlight,
}

impl SlotGuard {
    fn acquire(in_flight: &InFlight, key: &str) -> Self {
        let mut slots = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = Arc::clone(slots.entry(key.to_string()).or_default());
        Self {
            key: key.to_string(),
            slot,
            in_flight: Arc::clone(in_flight),
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut slots = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Only the map and this guard remain: nobody is waiting
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::http::StatusCode;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (calls.clone(), calls)
    }

    #[tokio::test]
    async fn test_caches_successful_responses() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let handler = cache.wrap(CacheOptions::default(), move |_req| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Outcome::Success("X".to_string()))
            }
        });

        let first = handler.call(RequestContext::from_path("/test")).await.unwrap();
        let second = handler.call(RequestContext::from_path("/test")).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(first, Outcome::Success("X".to_string()));
        assert_eq!(second, first);
        assert!(cache.has("cache:/test").await);
    }

    #[tokio::test]
    async fn test_does_not_cache_failure_outcomes() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let handler = cache.wrap(CacheOptions::default(), move |_req| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Outcome::failure(StatusCode::BAD_GATEWAY, "err"))
            }
        });

        handler.call(RequestContext::from_path("/test-fail")).await.unwrap();
        let second = handler.call(RequestContext::from_path("/test-fail")).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(matches!(second, Outcome::Failure { .. }));
        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn test_handler_errors_propagate_and_are_not_cached() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let handler = cache.wrap(CacheOptions::default(), move |_req| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<Outcome<String>, _>("upstream down")
            }
        });

        let err = handler.call(RequestContext::from_path("/boom")).await.unwrap_err();
        assert_eq!(err, "upstream down");
        assert!(handler.call(RequestContext::from_path("/boom")).await.is_err());

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(!cache.has("cache:/boom").await);
    }

    #[tokio::test]
    async fn test_different_keys_are_isolated() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let handler = cache.wrap(CacheOptions::default(), move |_req| {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok::<_, Infallible>(Outcome::Success(format!("data{}", n)))
            }
        });

        let a = handler.call(RequestContext::from_path("/a")).await.unwrap();
        let b = handler.call(RequestContext::from_path("/b")).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(a, Outcome::Success("data1".to_string()));
        assert_eq!(b, Outcome::Success("data2".to_string()));

        // Cached /a is unaffected by the call for /b
        let again = handler.call(RequestContext::from_path("/a")).await.unwrap();
        assert_eq!(again, a);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let handler = cache.wrap(CacheOptions::default().with_ttl_ms(50), move |_req| {
            let calls = calls.clone();
            async move {
                let data = if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    "old"
                } else {
                    "new"
                };
                Ok::<_, Infallible>(Outcome::Success(data.to_string()))
            }
        });

        let first = handler.call(RequestContext::from_path("/ttl")).await.unwrap();
        assert_eq!(first, Outcome::Success("old".to_string()));

        tokio::time::sleep(Duration::from_millis(100)).await;

        let second = handler.call(RequestContext::from_path("/ttl")).await.unwrap();
        assert_eq!(second, Outcome::Success("new".to_string()));
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        let entry = cache.get_entry("cache:/ttl").await.unwrap();
        assert_eq!(entry.value, "new");
    }

    #[tokio::test]
    async fn test_zero_ttl_still_writes_entries() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let handler = cache.wrap(CacheOptions::default().with_ttl_ms(0), move |_req| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Outcome::Success("v".to_string()))
            }
        });

        handler.call(RequestContext::from_path("/zero")).await.unwrap();
        handler.call(RequestContext::from_path("/zero")).await.unwrap();
        handler.call(RequestContext::from_path("/other")).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(cache.size().await, 2);
    }

    #[tokio::test]
    async fn test_custom_key_generator_collapses_requests() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let options = CacheOptions::default().with_key_generator(|_req| "constant".to_string());
        let handler = cache.wrap(options, move |req: RequestContext| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Outcome::Success(req.path_and_query().to_string()))
            }
        });

        let first = handler.call(RequestContext::from_path("/one")).await.unwrap();
        let second = handler.call(RequestContext::from_path("/two")).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(second, first);
        assert_eq!(second, Outcome::Success("/one".to_string()));
        assert!(cache.has("constant").await);
    }

    #[tokio::test]
    async fn test_clear_key_and_clear_all() {
        let cache = ResponseCache::<String>::new();
        let handler = cache.wrap(CacheOptions::default(), |req: RequestContext| async move {
            Ok::<_, Infallible>(Outcome::Success(req.path_and_query().to_string()))
        });

        handler.call(RequestContext::from_path("/x")).await.unwrap();
        handler.call(RequestContext::from_path("/y")).await.unwrap();
        assert_eq!(cache.size().await, 2);

        assert!(cache.clear_key("cache:/x").await);
        assert!(!cache.has("cache:/x").await);
        assert!(cache.has("cache:/y").await);
        assert!(!cache.clear_key("cache:/x").await);

        assert_eq!(cache.clear_all().await, 1);
        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn test_stats_count_hits_misses_and_stores() {
        let cache = ResponseCache::<String>::new();
        let handler = cache.wrap(CacheOptions::default(), |_req| async {
            Ok::<_, Infallible>(Outcome::Success("v".to_string()))
        });

        handler.call(RequestContext::from_path("/s")).await.unwrap();
        handler.call(RequestContext::from_path("/s")).await.unwrap();
        handler.call(RequestContext::from_path("/s")).await.unwrap();

        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.stores, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_not_coalesced_by_default() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let handler = cache.wrap(CacheOptions::default(), move |_req| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok::<_, Infallible>(Outcome::Success("v".to_string()))
            }
        });

        let (a, b) = tokio::join!(
            handler.call(RequestContext::from_path("/stampede")),
            handler.call(RequestContext::from_path("/stampede")),
        );

        assert_eq!(a.unwrap(), Outcome::Success("v".to_string()));
        assert_eq!(b.unwrap(), Outcome::Success("v".to_string()));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(cache.size().await, 1);
    }

    #[tokio::test]
    async fn test_single_flight_coalesces_concurrent_misses() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let options = CacheOptions::default().with_single_flight(true);
        let handler = cache.wrap(options, move |_req| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok::<_, Infallible>(Outcome::Success("shared".to_string()))
            }
        });

        let (a, b, c) = tokio::join!(
            handler.call(RequestContext::from_path("/stampede")),
            handler.call(RequestContext::from_path("/stampede")),
            handler.call(RequestContext::from_path("/stampede")),
        );

        assert_eq!(a.unwrap(), Outcome::Success("shared".to_string()));
        assert_eq!(b.unwrap(), Outcome::Success("shared".to_string()));
        assert_eq!(c.unwrap(), Outcome::Success("shared".to_string()));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(handler.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_flight_retries_after_failure() {
        let cache = ResponseCache::<String>::new();
        let (calls, seen) = counter();
        let options = CacheOptions::default().with_single_flight(true);
        let handler = cache.wrap(options, move |_req| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, Infallible>(Outcome::<String>::bad_request("nope"))
            }
        });

        let (a, b) = tokio::join!(
            handler.call(RequestContext::from_path("/f")),
            handler.call(RequestContext::from_path("/f")),
        );

        assert!(matches!(a.unwrap(), Outcome::Failure { .. }));
        assert!(matches!(b.unwrap(), Outcome::Failure { .. }));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_flight_releases_slot_when_cancelled() {
        let cache = ResponseCache::<String>::new();
        let options = CacheOptions::default().with_single_flight(true);
        let handler = cache.wrap(options, |_req| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, Infallible>(Outcome::Success("late".to_string()))
        });

        let (holder, waiter) = tokio::join!(
            tokio::time::timeout(
                Duration::from_millis(20),
                handler.call(RequestContext::from_path("/slow")),
            ),
            tokio::time::timeout(
                Duration::from_millis(40),
                handler.call(RequestContext::from_path("/slow")),
            ),
        );

        assert!(holder.is_err());
        assert!(waiter.is_err());
        assert!(handler.in_flight.lock().unwrap().is_empty());
        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn test_hits_only_need_shared_access() {
        let cache = ResponseCache::<String>::new();
        let handler = cache.wrap(CacheOptions::default(), |_req| async {
            Ok::<_, Infallible>(Outcome::Success("v".to_string()))
        });
        handler.call(RequestContext::from_path("/shared")).await.unwrap();

        // A concurrent reader must not block the hit path
        let _reader = cache.store.read().await;
        let hit = tokio::time::timeout(
            Duration::from_millis(100),
            handler.call(RequestContext::from_path("/shared")),
        )
        .await
        .expect("hit blocked behind a reader");

        assert_eq!(hit.unwrap(), Outcome::Success("v".to_string()));
        assert_eq!(cache.store.read().await.stats().hits, 1);
    }
}
