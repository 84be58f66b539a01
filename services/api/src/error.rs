//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its
//! mapping onto HTTP responses. Clients always receive a JSON object with a
//! human-readable `message`; internals are logged, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::ConfigError;
use skill_tracker_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required request input was absent or malformed.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Absent or invalid bearer credential.
    #[error("Unauthorized")]
    Unauthorized,

    /// Unknown platform user, share token or resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An unrecoverable upstream platform failure.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// A feature whose backing service is not configured.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Represents an error that propagated up from one of the core
    /// service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a standard Input/Output error (e.g., binding to a socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Port(PortError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Port(PortError::Unauthorized) => StatusCode::UNAUTHORIZED,
            // Upstream failures surface as a generic 500 to keep the
            // client contract simple.
            Self::Upstream(_)
            | Self::Port(PortError::Unexpected(_))
            | Self::Database(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing message. Server-side detail stays in the logs.
    fn client_message(&self) -> String {
        match self {
            Self::MissingInput(what) => format!("Missing data: {}", what),
            Self::Unauthorized | Self::Port(PortError::Unauthorized) => {
                "Unauthorized".to_string()
            }
            Self::NotFound(msg) | Self::Port(PortError::NotFound(msg)) => msg.clone(),
            Self::Unavailable(msg) => msg.clone(),
            Self::Port(PortError::InvalidInput(msg)) => msg.clone(),
            _ => "Server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "message": self.client_message() }))).into_response()
    }
}

/// A convenience type alias used by every handler.
pub type ApiResult<T> = Result<T, ApiError>;
