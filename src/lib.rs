//! NEO Proxy - A caching proxy for NASA near-Earth-object data
//!
//! Forwards feed, browse and lookup requests to the NeoWs API and memoizes
//! successful responses in a TTL cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use cache::{CacheOptions, ResponseCache};
pub use config::Config;
pub use tasks::spawn_sweep_task;
