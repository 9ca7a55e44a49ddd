//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::PipelineError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Upstream failure: {message}")]
    Upstream { code: &'static str, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "DOCUMENT_NOT_FOUND", detail),
            ApiError::Upstream { code, message } => (StatusCode::BAD_GATEWAY, code, message),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::DocumentNotFound { .. } => ApiError::NotFound(err.to_string()),
            PipelineError::Persistence(e) => ApiError::Internal(e.to_string()),
            e if e.is_client_error() => ApiError::BadRequest {
                code: e.code(),
                message: e.to_string(),
            },
            e => ApiError::Upstream {
                code: e.code(),
                message: e.to_string(),
            },
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("pipeline task failed: {err}"))
    }
}
