//! Custom error types for the task API

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the task API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    /// No task with that id is owned by the caller
    #[error("Task not found")]
    NotFound,

    /// Persistence failure; `context` names the operation, `detail` is the
    /// underlying error message
    #[error("{context}: {detail}")]
    Internal {
        context: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn internal(context: &'static str, error: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            context,
            detail: error.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "message": message }))
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "message": "Task not found" })),
            ApiError::Internal { context, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": context, "error": detail }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
