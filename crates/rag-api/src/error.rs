//! Error types for the remote service client.

use thiserror::Error;

/// Errors that can occur while talking to the remote service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server replied with a non-success status
    #[error("server error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Document does not exist on the server (404 on delete)
    #[error("document not found: {0}")]
    NotFound(String),
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;
