//! Error types for API calls.

use thiserror::Error;

/// Errors from talking to the TPC-C API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete (DNS, connection refused, timeout).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The requested record does not exist (HTTP 404 on lookups).
    #[error("{0} not found")]
    NotFound(String),

    /// A 2xx response whose body could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The configured base URL is not an absolute http(s) URL.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status of the failure, if the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::NotFound(_) => Some(404),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure was a client-side timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}
