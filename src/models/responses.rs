//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats};

/// Success envelope shared by every data endpoint: `{success: true, data}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error response body: `{success: false, message}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Error message describing what went wrong
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Body for unmatched routes
#[derive(Debug, Clone, Serialize)]
pub struct RouteNotFoundResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl RouteNotFoundResponse {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            success: false,
            error: "Route not found".to_string(),
            message: format!("Route {}:{} not found", method, path),
        }
    }
}

/// Response body for GET /
#[derive(Debug, Clone, Serialize)]
pub struct WelcomeResponse {
    pub success: bool,
    pub message: String,
    pub version: String,
}

impl WelcomeResponse {
    pub fn new() -> Self {
        Self {
            success: true,
            message: "Welcome to the NEO proxy API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for WelcomeResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: f64,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(uptime: f64) -> Self {
        Self {
            success: true,
            message: "Server is running".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime,
        }
    }
}

/// Data for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            size: stats.total_entries,
            hits: stats.hits,
            misses: stats.misses,
            stores: stats.stores,
        }
    }
}

/// Data for GET /cache/entry
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryResponse {
    pub key: String,
    /// Storage time (Unix milliseconds)
    pub stored_at: u64,
    pub age_ms: u64,
    pub value: Value,
}

impl CacheEntryResponse {
    pub fn new(key: impl Into<String>, entry: CacheEntry<Value>) -> Self {
        Self {
            key: key.into(),
            stored_at: entry.stored_at,
            age_ms: entry.age_ms(),
            value: entry.value,
        }
    }
}

/// Data for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub cleared: usize,
}

/// Data for DELETE /cache/entry
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub key: String,
    pub deleted: bool,
}
