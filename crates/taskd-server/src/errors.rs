//! HTTP error mapping.
//!
//! Not-Found is the only application error a client sees by name. Every
//! other failure is logged with its cause and answered with a bare 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use taskd_store::StoreError;
use thiserror::Error;
use tracing::error;

/// Message returned with every 404.
pub const NOT_FOUND_DETAIL: &str = "Task not found";

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No task has the requested id.
    #[error("Task not found")]
    NotFound,
    /// Storage or runtime failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::NotFound,
            other => Self::Internal(other.to_string()),
        }
    }
}

/// JSON error body: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    detail: NOT_FOUND_DETAIL.to_string(),
                }),
            )
                .into_response(),
            Self::Internal(cause) => {
                error!(error = %cause, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        detail: "Internal Server Error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
