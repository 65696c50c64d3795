//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::api::DEFAULT_RATE_LIMIT_PER_MINUTE;
use crate::cache::DEFAULT_TTL_MS;
use crate::upstream::{DEFAULT_API_KEY, DEFAULT_API_URL};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind
    pub host: String,
    /// HTTP server port
    pub server_port: u16,
    /// NASA API key
    pub api_key: String,
    /// NASA API base URL
    pub api_url: String,
    /// TTL in milliseconds for cached NEO responses
    pub cache_ttl_ms: u64,
    /// Stale-entry sweep interval in seconds, 0 disables the sweep
    pub sweep_interval: u64,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// Requests allowed per client per minute, 0 disables the limit
    pub rate_limit_per_minute: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `HOST` - Bind address (default: 0.0.0.0)
    /// - `PORT` - HTTP server port (default: 3001)
    /// - `NASA_API_KEY` - Upstream API key (default: DEMO)
    /// - `NASA_API_URL` - Upstream base URL (default: https://api.nasa.gov)
    /// - `CACHE_TTL_MS` - Response TTL in milliseconds (default: 300000)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 0, off)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream timeout in seconds (default: 30)
    /// - `RATE_LIMIT_PER_MINUTE` - Requests per client per minute (default: 100, 0 = off)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            server_port: parse_env("PORT").unwrap_or(defaults.server_port),
            api_key: env::var("NASA_API_KEY").unwrap_or(defaults.api_key),
            api_url: env::var("NASA_API_URL").unwrap_or(defaults.api_url),
            cache_ttl_ms: parse_env("CACHE_TTL_MS").unwrap_or(defaults.cache_ttl_ms),
            sweep_interval: parse_env("CACHE_SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            upstream_timeout: parse_env("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout),
            rate_limit_per_minute: parse_env("RATE_LIMIT_PER_MINUTE")
                .unwrap_or(defaults.rate_limit_per_minute),
        }
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.server_port)
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            server_port: 3001,
            api_key: DEFAULT_API_KEY.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            cache_ttl_ms: DEFAULT_TTL_MS,
            sweep_interval: 0,
            upstream_timeout: 30,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }
}
