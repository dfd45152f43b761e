//! API error types with HTTP response mapping.

use application::HandlerError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API-level error type that maps to HTTP responses.
///
/// Expected outcomes never reach this type; they travel inside the
/// envelope with a 200 status.
#[derive(Debug)]
pub enum ApiError {
    /// Request body or path could not be read.
    BadRequest(String),
    /// The caller exceeded its request budget.
    RateLimited,
    /// An unhandled fault escaped the request pipeline.
    Handler(HandlerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests".to_string(),
            ),
            // Already logged by the pipeline; the body stays empty.
            ApiError::Handler(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<HandlerError> for ApiError {
    fn from(err: HandlerError) -> Self {
        ApiError::Handler(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
