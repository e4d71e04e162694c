//! HTTP error mapping
//!
//! One error type for all handlers, translated to the status codes the
//! desktop client expects: 400 for validation, 401/403 for identity and
//! permission problems, 404 for missing rows, 409 for natural-key
//! collisions, 500 for anything touching the store.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dideco_common::api::ApiResponse;
use dideco_common::Error;
use tracing::error;

/// Handler-level error, convertible straight into a response envelope
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request field (rejected before any write)
    Validation(String),
    /// Caller could not be identified
    Unauthorized(String),
    /// Caller identified but lacks the capability flag
    Forbidden(String),
    /// Row does not exist
    NotFound(String),
    /// Duplicate natural key (rut, username, folio)
    Conflict(String),
    /// Store failure; logged in full, surfaced generically
    Database(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => ApiError::Validation(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Database(e) => ApiError::Database(e.to_string()),
            other => ApiError::Database(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(what) => {
                (StatusCode::CONFLICT, format!("{} already exists", what))
            }
            ApiError::Database(detail) => {
                // Full detail stays in the log; the client gets a generic line
                error!("Database error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error, please retry the action".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::err(message))).into_response()
    }
}
