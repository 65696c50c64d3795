//! HTTP Middleware
//!
//! Security response headers and the per-client request limit applied
//! around every route.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
    Router,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

use crate::error::NeoError;

/// Requests allowed per client per minute unless configured otherwise
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

// == Security Headers ==
/// Headers added to every response that does not already carry them.
pub const SECURITY_HEADERS: [(&str, &str); 12] = [
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "cross-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    (
        "strict-transport-security",
        "max-age=15552000; includeSubDomains",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Layers [`SECURITY_HEADERS`] onto `router`.
pub fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

// == Rate Limiting ==
/// Request limiter keyed by client IP.
///
/// Requests without connection info (in-process callers) share the `None`
/// bucket.
pub type ClientRateLimiter = DefaultKeyedRateLimiter<Option<IpAddr>>;

pub fn client_rate_limiter(per_minute: NonZeroU32) -> Arc<ClientRateLimiter> {
    Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute)))
}

/// Rejects the request with 429 once its client has used up the quota.
pub async fn enforce_rate_limit(
    State(limiter): State<Arc<ClientRateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, NeoError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Err(not_until) = limiter.check_key(&client) {
        let wait = not_until.wait_time_from(DefaultClock::default().now());
        warn!(client = ?client, "Rate limit exceeded");
        return Err(NeoError::RateLimited {
            retry_after_secs: whole_seconds(wait),
        });
    }

    Ok(next.run(request).await)
}

/// Rounds up to whole seconds, never below one.
fn whole_seconds(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
