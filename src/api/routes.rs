//! API Routes
//!
//! Configures the Axum router. The three NEO routes are wrapped with the
//! shared response cache here.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path},
    http::HeaderMap,
    middleware,
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_entry_handler, cache_stats_handler, clear_cache_handler, delete_entry_handler,
    health_handler, neo_browse, neo_feed, neo_lookup, not_found_handler, root_handler, AppState,
};
use super::middleware::{client_rate_limiter, enforce_rate_limit, with_security_headers};
use crate::cache::{CacheOptions, RequestContext};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Welcome message
/// - `GET /health` - Health check endpoint
/// - `GET /neo/feed` - Close approaches between two dates (cached)
/// - `GET /neo/browse` - Paged asteroid catalogue (cached)
/// - `GET /neo/lookup/:id` - Single asteroid (cached)
/// - `GET /cache/stats`, `GET|DELETE /cache/entry`, `DELETE /cache` - Cache admin
///
/// # Middleware
/// - Rate limit: `rate_limit_per_minute` requests per client, 429 beyond
/// - Security headers: helmet-style defaults on every response
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let options = CacheOptions::default().with_ttl_ms(state.cache_ttl_ms);

    let client = state.client.clone();
    let feed = Arc::new(state.cache.wrap(options.clone(), move |ctx| {
        let client = client.clone();
        async move { neo_feed(&client, ctx).await }
    }));

    let client = state.client.clone();
    let browse = Arc::new(state.cache.wrap(options.clone(), move |ctx| {
        let client = client.clone();
        async move { neo_browse(&client, ctx).await }
    }));

    let client = state.client.clone();
    let lookup = Arc::new(state.cache.wrap(options, move |ctx| {
        let client = client.clone();
        async move { neo_lookup(&client, ctx).await }
    }));

    let neo = Router::new()
        .route(
            "/feed",
            get(move |OriginalUri(uri): OriginalUri, headers: HeaderMap| async move {
                feed.call(RequestContext::new(uri, headers)).await
            }),
        )
        .route(
            "/browse",
            get(move |OriginalUri(uri): OriginalUri, headers: HeaderMap| async move {
                browse.call(RequestContext::new(uri, headers)).await
            }),
        )
        .route(
            "/lookup/:id",
            get(
                move |Path(id): Path<String>, OriginalUri(uri): OriginalUri, headers: HeaderMap| async move {
                    let ctx = RequestContext::new(uri, headers).with_path_param("id", id);
                    lookup.call(ctx).await
                },
            ),
        );

    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route(
            "/cache/entry",
            get(cache_entry_handler).delete(delete_entry_handler),
        )
        .nest("/neo", neo)
        .fallback(not_found_handler);

    if let Some(per_minute) = NonZeroU32::new(state.rate_limit_per_minute) {
        router = router.layer(middleware::from_fn_with_state(
            client_rate_limiter(per_minute),
            enforce_rate_limit,
        ));
    }

    with_security_headers(router)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
