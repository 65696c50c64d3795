//! API Module
//!
//! HTTP handlers and routing for the proxy REST API.
//!
//! # Endpoints
//! - `GET /neo/feed` - NEO feed for a date range (cached)
//! - `GET /neo/browse` - Browse the NEO catalogue (cached)
//! - `GET /neo/lookup/:id` - Look up one NEO (cached)
//! - `GET /health` - Health check endpoint
//! - `/cache/...` - Cache administration

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::DEFAULT_RATE_LIMIT_PER_MINUTE;
pub use routes::create_router;
