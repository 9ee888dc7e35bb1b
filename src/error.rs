//! Error taxonomy and HTTP mapping.
//!
//! Store operations catch lower-level I/O and database errors and re-raise
//! them as one of four kinds; the boundary layer converts the kind into a
//! status code and an `{"error": "..."}` body. No raw lower-level error
//! escapes to a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed required field (400).
    #[error("{0}")]
    Validation(String),

    /// Referenced entity does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// Directory/file creation, read, write, or database failure (500).
    #[error("{0}")]
    Storage(String),

    /// Remote fetch failed or returned a non-success status (500). The
    /// message carries the upstream cause.
    #[error("{0}")]
    Download(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(format!("database error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(format!("filesystem error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("serialization error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Download(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
        }

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
