//! Request and Response models for the proxy API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{BrowseParams, CacheKeyQuery, FeedParams, LookupParams};
pub use responses::{
    ApiResponse, CacheEntryResponse, CacheStatsResponse, ClearResponse, DeleteResponse,
    ErrorResponse, HealthResponse, RouteNotFoundResponse, WelcomeResponse,
};
