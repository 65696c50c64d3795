//! Handler Outcome
//!
//! Tagged result returned by cacheable handlers. Only [`Outcome::Success`]
//! is ever written to the cache.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::{ApiResponse, ErrorResponse};

// == Outcome ==
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    /// Cache-eligible result
    Success(V),
    /// Handled failure, returned to the caller but never stored
    Failure { status: StatusCode, message: String },
}

impl<V> Outcome<V> {
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Outcome::Failure {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::failure(StatusCode::BAD_REQUEST, message)
    }
}

// == IntoResponse Implementation ==
impl<V: Serialize> IntoResponse for Outcome<V> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Success(data) => (StatusCode::OK, Json(ApiResponse::ok(data))).into_response(),
            Outcome::Failure { status, message } => {
                (status, Json(ErrorResponse::new(message))).into_response()
            }
        }
    }
}
