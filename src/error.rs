//! Error types surfaced by the request client and the typed API.
//!
//! # Taxonomy
//! ```text
//! Validation   → rejected locally, no network call
//! Client (4xx) → server refused the input, never retried
//! Server (5xx) → retried up to the budget, then surfaced
//! Network      → transport failure, retried up to the budget
//! Timeout      → per-attempt deadline or caller cancellation, never retried
//! ```

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown to users when a call timed out or was cancelled.
pub const TIMEOUT_USER_MESSAGE: &str =
    "The request timed out. Please check your connection and try again.";

/// Message shown to users when the server could not be reached.
pub const NETWORK_USER_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required input was missing or blank.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// The server answered with a non-success status.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: Option<String>,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Transport failure (DNS, refused, reset).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The per-attempt deadline elapsed.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The caller's cancellation token fired.
    #[error("Request was cancelled")]
    Cancelled,

    /// A success body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A success body was well formed but lacked a field the operation needs.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The configured base URL and path could not be joined.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Setup(String),
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Client,
    Server,
    Network,
    Timeout,
    /// Malformed responses and local setup problems.
    Internal,
}

impl ClientError {
    /// Build a validation error for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Http { status, .. } if status.is_server_error() => ErrorKind::Server,
            ClientError::Http { .. } => ErrorKind::Client,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Timeout(_) | ClientError::Cancelled => ErrorKind::Timeout,
            ClientError::Decode(_)
            | ClientError::UnexpectedResponse(_)
            | ClientError::InvalidUrl(_)
            | ClientError::Setup(_) => ErrorKind::Internal,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// HTTP status, when the failure came from a server response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Display-ready text for the UI layer.
    ///
    /// Timeouts and transport failures are relabelled with advice to check
    /// connectivity; everything else keeps its own message.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Timeout => TIMEOUT_USER_MESSAGE.to_string(),
            ErrorKind::Network => NETWORK_USER_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err)
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = ClientError::Http {
            status: StatusCode::NOT_FOUND,
            code: Some("NOT_FOUND".into()),
            message: "Task 7 not found".into(),
            details: None,
        };
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(err.to_string(), "Task 7 not found");

        let err = ClientError::Http {
            status: StatusCode::BAD_GATEWAY,
            code: None,
            message: "HTTP 502: Bad Gateway".into(),
            details: None,
        };
        assert_eq!(err.kind(), ErrorKind::Server);

        assert_eq!(ClientError::Cancelled.kind(), ErrorKind::Timeout);
        assert!(ClientError::Timeout(Duration::from_secs(120)).is_timeout());
    }

    #[test]
    fn test_timeout_relabelled_for_users() {
        let err = ClientError::Timeout(Duration::from_millis(120_000));
        assert_eq!(err.to_string(), "Request timed out after 120000ms");
        assert_eq!(err.user_message(), TIMEOUT_USER_MESSAGE);
        assert_eq!(ClientError::Cancelled.user_message(), TIMEOUT_USER_MESSAGE);
    }

    #[test]
    fn test_validation_message_passthrough() {
        let err = ClientError::validation("message", "Message cannot be empty");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.user_message(), "Message cannot be empty");
    }
}
