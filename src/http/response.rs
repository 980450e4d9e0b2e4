//! Buffered responses and error-body normalization.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Error body returned by the backend on 4xx/5xx.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// A settled attempt with its body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub request_id: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Convert a non-2xx response into [`ClientError::Http`].
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(http_error(self.status, &self.body))
        }
    }

    /// Decode a 2xx body as `T`, or normalize the failure.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let response = self.error_for_status()?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Build the error for a failed status, preferring the structured body.
pub fn http_error(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => ClientError::Http {
            status,
            code: Some(parsed.error),
            message: parsed.message,
            details: parsed.details,
        },
        Err(_) => ClientError::Http {
            status,
            code: None,
            message: fallback_message(status),
            details: None,
        },
    }
}

/// `HTTP <code>: <reason>` for bodies that are not the structured shape.
pub fn fallback_message(status: StatusCode) -> String {
    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    )
}
