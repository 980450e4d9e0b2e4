//! Error responses of the mock backend.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::http::response::ErrorBody;

#[derive(Debug, Error)]
pub enum MockError {
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<&'static str>,
    },

    #[error("{0}")]
    NotFound(String),
}

impl MockError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            MockError::Validation { .. } => StatusCode::BAD_REQUEST,
            MockError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MockError::Validation { .. } => "VALIDATION_ERROR",
            MockError::NotFound(_) => "NOT_FOUND",
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let details = match &self {
            MockError::Validation {
                field: Some(field), ..
            } => Some(serde_json::json!({ "field": field })),
            _ => None,
        };
        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
            details,
        };
        tracing::debug!(status = %self.status(), error = %self, "Mock request rejected");
        (self.status(), Json(body)).into_response()
    }
}
