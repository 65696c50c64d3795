//! Stale Entry Sweep
//!
//! Background task that periodically drops cache entries past a maximum age.
//! Reads never depend on it: wrapped handlers ignore stale entries anyway.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ResponseCache;

/// Spawns a background task that periodically purges old cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between runs, and removes every entry at least `max_age_ms` old.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = ResponseCache::new();
/// let sweep_handle = spawn_sweep_task(cache.clone(), 60, 300_000);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V>(
    cache: ResponseCache<V>,
    interval_secs: u64,
    max_age_ms: u64,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_older_than(max_age_ms).await;

            if removed > 0 {
                info!("Cache sweep: removed {} stale entries", removed);
            } else {
                debug!("Cache sweep: no stale entries found");
            }
        }
    })
}
