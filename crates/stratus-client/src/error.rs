//! Error types for the Stratus API client

use thiserror::Error;

/// Errors that can occur when using the Stratus API client
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Endpoint cannot carry a path (e.g. `mailto:` style URLs)
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Request timeout
    #[error("Request timed out")]
    Timeout,

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// API answered with an empty or `null` body where a resource was expected
    #[error("API returned an empty response")]
    EmptyResponse,

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// HTTP status code, if the API answered at all
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the API reported the resource as absent
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if error is a gateway failure or a request that never got an answer
    #[must_use]
    pub fn is_gateway_error(&self) -> bool {
        match self {
            ClientError::Api { status, .. } => matches!(status, 502..=504),
            ClientError::Http(err) => err.is_timeout() || err.is_connect(),
            ClientError::Timeout => true,
            _ => false,
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
