//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;
use crate::upstream::UpstreamError;

// == NEO Error Enum ==
/// Unified error type for the proxy.
#[derive(Error, Debug)]
pub enum NeoError {
    /// The upstream API call failed; `resource` names the endpoint
    #[error("Failed to fetch NEO {resource}")]
    Upstream {
        resource: &'static str,
        #[source]
        source: UpstreamError,
    },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The client exceeded its request quota
    #[error("Rate limit exceeded, retry in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
}

impl NeoError {
    /// Wraps an upstream failure for the named resource.
    pub fn upstream(resource: &'static str) -> impl FnOnce(UpstreamError) -> Self {
        move |source| NeoError::Upstream { resource, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            NeoError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            NeoError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            NeoError::NotFound(_) => StatusCode::NOT_FOUND,
            NeoError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for NeoError {
    fn into_response(self) -> Response {
        if let NeoError::Upstream { resource, source } = &self {
            error!(resource, error = %source, "Upstream request failed");
        }

        let status = self.status();
        let mut response = (status, Json(ErrorResponse::new(self.to_string()))).into_response();
        if let NeoError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, NeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_message_names_resource() {
        let err = NeoError::upstream("feed")(UpstreamError::Status(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(err.to_string(), "Failed to fetch NEO feed");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            NeoError::InvalidRequest("key is required".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            NeoError::NotFound("cache:/x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = NeoError::RateLimited { retry_after_secs: 3 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");
    }
}
