//! Error types for moodmix-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Empty or whitespace-only text input (400). The HTTP boundary
    /// rejects empty input loudly; the core library fails soft instead.
    #[error("Empty text input")]
    EmptyText,

    /// No image part in the multipart request (400)
    #[error("No image in request")]
    MissingImage,

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::EmptyText => (
                StatusCode::BAD_REQUEST,
                "EMPTY_TEXT",
                "user_text must not be empty".to_string(),
            ),
            ApiError::MissingImage => (
                StatusCode::BAD_REQUEST,
                "NO_IMAGE",
                "multipart field 'image' is required".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
