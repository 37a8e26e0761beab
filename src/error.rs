// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{models::user::Plan, store::StoreError};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    InvalidRequest(String),

    // 404 Not Found (also used for records owned by someone else)
    NotFound(String),

    // 403 Forbidden
    QuotaExceeded { plan: Plan, limit: u64 },

    // 409 Conflict (e.g., duplicate userId)
    Conflict(String),

    // 500 Internal Server Error
    StoreUnavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::StoreUnavailable(msg) => f.write_str(msg),
            AppError::QuotaExceeded { plan, limit } => write!(
                f,
                "User with {} plan can only create up to {} quizzes",
                plan, limit
            ),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                let body = Json(json!({ "error": "Internal Server Error" }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Allows using `?` on store calls.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
        }
    }
}

/// Request bodies that do not fit the expected shape are client errors.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}
