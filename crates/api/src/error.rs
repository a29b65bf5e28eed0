//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use intake::IntakeError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or invalid input from the client.
    BadRequest(String),
    /// Missing or invalid credential.
    Unauthorized(String),
    /// Resource not found.
    NotFound(String),
    /// An upstream dependency (store, OCR, completion service) failed.
    Upstream(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Upstream(msg) => {
                tracing::error!(error = %msg, "upstream service failure");
                (StatusCode::BAD_GATEWAY, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_) => ApiError::BadRequest(err.to_string()),
            DomainError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DomainError::Store(_) => ApiError::Upstream(err.to_string()),
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::UnsupportedMediaType(_) => ApiError::BadRequest(err.to_string()),
            IntakeError::Ocr(_) | IntakeError::Completion(_) => {
                ApiError::Upstream(err.to_string())
            }
        }
    }
}
