//! Upstream Module
//!
//! HTTP client for the NASA NeoWs (Near Earth Object Web Service) API.

mod client;

pub use client::{NeoClient, UpstreamError, DEFAULT_API_KEY, DEFAULT_API_URL};
