//! Error types for Refollow
//!
//! Defines the error enum covering every failure mode of the relay, plus the
//! mapping from errors to HTTP status codes and caller-visible messages.
//! Uses thiserror for ergonomic error handling.

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for Refollow operations
pub type Result<T> = std::result::Result<T, RefollowError>;

/// Generic message returned to callers for any upstream or internal failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Failed to fetch refollow data";

/// Error type for Refollow operations
#[derive(Error, Debug)]
pub enum RefollowError {
    /// Missing or malformed caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller does not follow every required creator
    #[error("{message}")]
    GateDenied {
        message: String,
        required: Vec<String>,
    },

    /// Upstream provider answered with a non-success status
    #[error("Upstream error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Transport-level failure talking to the upstream provider
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fatal startup errors (e.g. missing service credential)
    #[error("Startup error: {0}")]
    Startup(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl RefollowError {
    /// Build a gate denial naming the required creator handles
    pub fn gate_denied(required: Vec<String>) -> Self {
        let names = required
            .iter()
            .map(|h| format!("@{}", h))
            .collect::<Vec<_>>()
            .join(" and ");
        Self::GateDenied {
            message: format!("You must follow {} to use this app", names),
            required,
        }
    }

    /// HTTP status this error surfaces as
    pub fn status_code(&self) -> StatusCode {
        match self {
            RefollowError::Validation(_) => StatusCode::BAD_REQUEST,
            RefollowError::GateDenied { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller
    ///
    /// Upstream and internal details are logged, never returned.
    pub fn public_message(&self) -> String {
        match self {
            RefollowError::Validation(msg) => msg.clone(),
            RefollowError::GateDenied { message, .. } => message.clone(),
            _ => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether this error came from talking to the upstream provider
    pub fn is_upstream(&self) -> bool {
        matches!(self, RefollowError::Upstream { .. } | RefollowError::Http(_))
    }
}
