//! Error types for the dashboard engine
//!
//! Provides unified error handling using thiserror. The engines themselves
//! only fail on invalid construction or encoder failures; everything else is
//! either a no-op or an absent value.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors raised by the cache engine and its snapshot storage.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Construction parameters are unusable (zero capacity, zero interval, ...)
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// Snapshot storage could not be read or written
    #[error("Snapshot storage error: {0}")]
    Storage(String),

    /// Snapshot payload could not be encoded or decoded
    #[error("Snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// == Export Error Enum ==
/// Errors raised while materializing grid rows into an export format.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "xlsx")]
    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The print target refused or failed to render the document
    #[error("Print failed: {0}")]
    Print(String),

    /// Delimiter outside printable ASCII, or one that collides with quoting
    #[error("Invalid CSV delimiter {0:?}")]
    InvalidDelimiter(char),

    /// Export was requested on a grid configured without export
    #[error("Export is disabled for this grid")]
    Disabled,
}

// == Service Error Enum ==
/// Errors raised by the collaborator services (HTTP, sessions, permissions).
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Permission denied: {action} on {resource}")]
    PermissionDenied { resource: String, action: String },

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upstream returned something the caller could not use
    #[error("Upstream error: {0}")]
    Upstream(String),
}

// == Validation Error ==
/// A domain value failed its per-variant validation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// == API Error Enum ==
/// Error type for the HTTP surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Export(ExportError::Disabled) => StatusCode::FORBIDDEN,
            ApiError::Export(ExportError::InvalidDelimiter(_)) => StatusCode::BAD_REQUEST,
            ApiError::Cache(CacheError::InvalidConfig(_)) => StatusCode::BAD_REQUEST,
            ApiError::Export(_) | ApiError::Cache(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
