//! Error types for backend requests.

use thiserror::Error;

/// Errors that can occur while talking to the analysis backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClientError {
    /// The request could not be sent or the connection failed.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body did not match the expected contract.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The client configuration is unusable (bad base URL, TLS setup, ...).
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns a user-facing message that hides transport details.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) | Self::Status { .. } => {
                "Could not reach the analysis backend. Ensure the backend is running."
            }
            Self::Decode(_) => "The analysis backend returned an unexpected response.",
            Self::Config(_) => "The analysis backend address is not configured correctly.",
        }
    }

    /// Returns whether a later, user-triggered retry could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) | Self::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for backend requests.
pub type Result<T> = std::result::Result<T, ClientError>;
