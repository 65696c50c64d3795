//! API Handlers
//!
//! The three NEO handlers run behind the response cache; the remaining
//! handlers serve health and cache administration.

use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    Json,
};
use serde_json::Value;

use super::middleware::DEFAULT_RATE_LIMIT_PER_MINUTE;
use crate::cache::{Outcome, RequestContext, ResponseCache};
use crate::config::Config;
use crate::error::{NeoError, Result};
use crate::models::{
    ApiResponse, BrowseParams, CacheEntryResponse, CacheKeyQuery, CacheStatsResponse,
    ClearResponse, DeleteResponse, FeedParams, HealthResponse, LookupParams,
    RouteNotFoundResponse, WelcomeResponse,
};
use crate::upstream::{NeoClient, UpstreamError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Response cache shared by the NEO routes
    pub cache: ResponseCache,
    /// Upstream NeoWs client
    pub client: NeoClient,
    /// TTL applied to every NEO route
    pub cache_ttl_ms: u64,
    /// Requests allowed per client per minute, 0 disables the limit
    pub rate_limit_per_minute: u32,
    started_at: Instant,
}

impl AppState {
    /// Creates a new AppState around an existing cache and client.
    pub fn new(cache: ResponseCache, client: NeoClient, cache_ttl_ms: u64) -> Self {
        Self {
            cache,
            client,
            cache_ttl_ms,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            started_at: Instant::now(),
        }
    }

    /// Overrides the per-client request limit.
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit_per_minute = per_minute;
        self
    }

    /// Creates a new AppState from configuration with an empty cache.
    pub fn from_config(config: &Config) -> std::result::Result<Self, UpstreamError> {
        let client = NeoClient::new(
            &config.api_url,
            &config.api_key,
            Duration::from_secs(config.upstream_timeout),
        )?;
        Ok(Self::new(ResponseCache::new(), client, config.cache_ttl_ms)
            .with_rate_limit(config.rate_limit_per_minute))
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

// == NEO Handlers ==

/// GET /neo/feed?start_date&end_date
pub async fn neo_feed(client: &NeoClient, ctx: RequestContext) -> Result<Outcome<Value>> {
    let Some(params) = FeedParams::from_context(&ctx) else {
        return Ok(Outcome::bad_request("start_date and end_date are required"));
    };

    let data = client
        .feed(&params.start_date, &params.end_date)
        .await
        .map_err(NeoError::upstream("feed"))?;
    Ok(Outcome::Success(data))
}

/// GET /neo/browse?page&size
pub async fn neo_browse(client: &NeoClient, ctx: RequestContext) -> Result<Outcome<Value>> {
    let params = BrowseParams::from_context(&ctx);

    let data = client
        .browse(params.page, params.size)
        .await
        .map_err(NeoError::upstream("browse"))?;
    Ok(Outcome::Success(data))
}

/// GET /neo/lookup/:id
pub async fn neo_lookup(client: &NeoClient, ctx: RequestContext) -> Result<Outcome<Value>> {
    let Some(params) = LookupParams::from_context(&ctx) else {
        return Ok(Outcome::bad_request("id must be a number"));
    };

    let data = client
        .lookup(params.id)
        .await
        .map_err(NeoError::upstream("lookup"))?;
    Ok(Outcome::Success(data))
}

// == Service Handlers ==

/// Handler for GET /
pub async fn root_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse::new())
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.uptime().as_secs_f64()))
}

/// Fallback for unmatched routes
pub async fn not_found_handler(
    method: Method,
    uri: Uri,
) -> (StatusCode, Json<RouteNotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFoundResponse::new(method.as_str(), &uri.to_string())),
    )
}

// == Cache Admin Handlers ==

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<CacheStatsResponse>> {
    let stats = state.cache.stats().await;
    Json(ApiResponse::ok(stats.into()))
}

/// Handler for GET /cache/entry?key=
pub async fn cache_entry_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheKeyQuery>,
) -> Result<Json<ApiResponse<CacheEntryResponse>>> {
    if let Some(error_msg) = query.validate() {
        return Err(NeoError::InvalidRequest(error_msg));
    }
    let key = query.key.unwrap_or_default();

    let entry = state
        .cache
        .get_entry(&key)
        .await
        .ok_or_else(|| NeoError::NotFound(key.clone()))?;

    Ok(Json(ApiResponse::ok(CacheEntryResponse::new(key, entry))))
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ApiResponse<ClearResponse>> {
    let cleared = state.cache.clear_all().await;
    Json(ApiResponse::ok(ClearResponse { cleared }))
}

/// Handler for DELETE /cache/entry?key=
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Query(query): Query<CacheKeyQuery>,
) -> Result<Json<ApiResponse<DeleteResponse>>> {
    if let Some(error_msg) = query.validate() {
        return Err(NeoError::InvalidRequest(error_msg));
    }
    let key = query.key.unwrap_or_default();

    let deleted = state.cache.clear_key(&key).await;
    Ok(Json(ApiResponse::ok(DeleteResponse { key, deleted })))
}
