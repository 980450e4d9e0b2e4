//! Typed API surface over the request client.
//!
//! # Data Flow
//! ```text
//! caller input
//!     → local validation (blank strings rejected, no network call)
//!     → JSON body / query string
//!     → RequestClient::execute
//!     → 2xx: decode typed payload
//!     → non-2xx: {error, message, details} or "HTTP <code>: <reason>"
//! ```
//!
//! Request and response types are shared with the mock backend so both
//! sides agree on the wire shapes.

pub mod chat;
pub mod docs;
pub mod export;
pub mod health;
pub mod query;
pub mod reminders;
pub mod sync;
pub mod tasks;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::{RequestClient, RequestOptions};

pub use chat::{ChatRequest, ChatResponse};
pub use docs::{DocAction, DocInfo, DocRequest, DocResponse};
pub use export::{ChatExport, DocExport, ExportFormat, ExportResponse, SheetExport};
pub use health::HealthReport;
pub use query::{
    QueryExportRequest, QueryExportResponse, QueryRequest, QueryResponse, SearchCriteria, SearchResponse,
    SheetDataResponse, SupportingRow, TabSnapshot, TabStats, TabsSummary, TankCapacityRequest,
    TankCapacityResponse, TankReading, TankTotals,
};
pub use reminders::{
    DueReminders, PdfRequest, PdfResponse, Reminder, ReminderAction, ReminderRequest,
    ReminderResponse,
};
pub use sync::{DocSyncInfo, SheetSyncInfo, SyncRequest, SyncResponse, SyncStatus};
pub use tasks::{NewTask, Task, TaskList, TaskPriority, TaskStatus, TaskUpdate, UpcomingTasks};

/// Typed client for the assistant backend.
///
/// Cheap to clone. A clone made with [`AssistantApi::with_cancellation`]
/// ties every call it issues to one token.
#[derive(Debug, Clone)]
pub struct AssistantApi {
    client: RequestClient,
    user_id: String,
    cancel: Option<CancellationToken>,
}

impl AssistantApi {
    pub fn new(client: RequestClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
            cancel: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(RequestClient::new(config)?, config.api.user_id.clone()))
    }

    pub fn client(&self) -> &RequestClient {
        &self.client
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// A copy whose calls are aborted when `token` fires.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            client: self.client.clone(),
            user_id: self.user_id.clone(),
            cancel: Some(token),
        }
    }

    async fn call<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> ClientResult<T> {
        let options = match &self.cancel {
            Some(token) => options.cancel_on(token.clone()),
            None => options,
        };
        self.client.execute(path, options).await?.json()
    }
}

/// Trim `value`, rejecting blank input for `field`.
pub(crate) fn require<'a>(field: &'static str, value: &'a str) -> ClientResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::validation(
            field,
            format!("{} cannot be empty", field),
        ));
    }
    Ok(trimmed)
}

/// Like [`require`], for optional inputs that must not be blank when present.
fn require_opt<'a>(field: &'static str, value: Option<&'a str>) -> ClientResult<Option<&'a str>> {
    value.map(|v| require(field, v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_require_trims() {
        assert_eq!(require("query", "  hello \n").unwrap(), "hello");
    }

    #[test]
    fn test_require_rejects_blank() {
        let err = require("message", " \t ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "message cannot be empty");
    }

    #[test]
    fn test_require_opt() {
        assert_eq!(require_opt("title", None).unwrap(), None);
        assert_eq!(require_opt("title", Some(" x ")).unwrap(), Some("x"));
        assert!(require_opt("title", Some("")).is_err());
    }
}
