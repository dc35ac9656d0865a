//! Error types for PaperDash
//!
//! Provides:
//! - `AppError`, the error every public operation returns
//! - `FetchError` for the paper fetch path (network, parse, timeout)
//! - `StoreLoadError` for rating store rehydration
//! - Error codes and HTTP status mapping for the gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidRating,

    // Resource errors (4xxx)
    PaperNotFound,

    // Storage errors (7xxx)
    StorageError,

    // Upstream / fetch errors (8xxx)
    NetworkError,
    ParseError,
    FetchTimeout,
    SourceReadError,

    // Internal errors (9xxx)
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidRating => 1002,

            ErrorCode::PaperNotFound => 4002,

            ErrorCode::StorageError => 7001,

            ErrorCode::NetworkError => 8001,
            ErrorCode::ParseError => 8002,
            ErrorCode::FetchTimeout => 8003,
            ErrorCode::SourceReadError => 8004,

            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Failures of the paper fetch path.
///
/// The bundled source never produces these; they exist for file and HTTP
/// backed sources. A file source that cannot read its inputs reports
/// `Read`, which is a local fault rather than an upstream one.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Fetch timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Failed to read '{path}': {message}")]
    Read { path: String, message: String },
}

/// Durable rating slot could not be turned back into records.
///
/// Never leaves the rating store: it recovers locally by starting empty.
#[derive(Error, Debug)]
pub enum StoreLoadError {
    #[error("Malformed rating data under '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read rating slot '{key}': {message}")]
    Read { key: String, message: String },
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Rating {rating} is outside the allowed range 1..=5")]
    InvalidRating { rating: i64 },

    #[error("Paper not found: {id}")]
    PaperNotFound { id: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidRating { .. } => ErrorCode::InvalidRating,
            AppError::PaperNotFound { .. } => ErrorCode::PaperNotFound,
            AppError::Storage { .. } => ErrorCode::StorageError,
            AppError::Fetch(FetchError::Network { .. }) => ErrorCode::NetworkError,
            AppError::Fetch(FetchError::Parse { .. }) => ErrorCode::ParseError,
            AppError::Fetch(FetchError::Timeout { .. }) => ErrorCode::FetchTimeout,
            AppError::Fetch(FetchError::Read { .. }) => ErrorCode::SourceReadError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::InvalidRating { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::PaperNotFound { .. } => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            AppError::Storage { .. }
            | AppError::Fetch(FetchError::Read { .. })
            | AppError::Configuration { .. }
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::Fetch(FetchError::Network { .. })
            | AppError::Fetch(FetchError::Parse { .. }) => StatusCode::BAD_GATEWAY,

            // 504 Gateway Timeout
            AppError::Fetch(FetchError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Fetch failures reach the dashboard as one generic message
        let message = match &self {
            AppError::Fetch(_) => "An error occurred while fetching papers".to_string(),
            other => other.to_string(),
        };

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %self,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let field = match self {
            AppError::Validation { field, .. } => field,
            AppError::InvalidRating { .. } => Some("rating".to_string()),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}
