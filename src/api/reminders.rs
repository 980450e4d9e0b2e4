//! Reminders and the PDF placeholder endpoint.

use serde::{Deserialize, Serialize};

use crate::api::{require, AssistantApi};
use crate::api::tasks::parse_due_date;
use crate::error::{ClientError, ClientResult};
use crate::http::RequestOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderAction {
    Set,
    List,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub action: ReminderAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// `YYYY-MM-DD HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: u64,
    pub message: String,
    pub datetime: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "active".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<Reminder>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,
}

/// Reminders that fell due and were marked sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueReminders {
    pub checked: usize,
    #[serde(default)]
    pub due: Vec<Reminder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfRequest {
    pub action: String,
    pub pdf_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfResponse {
    pub message: String,
    #[serde(default)]
    pub action: Option<String>,
    pub pdf_url: String,
}

impl AssistantApi {
    pub async fn set_reminder(&self, message: &str, datetime: &str) -> ClientResult<Reminder> {
        let message = require("message", message)?;
        let datetime = require("datetime", datetime)?;
        if parse_due_date(datetime).is_none() {
            return Err(ClientError::validation(
                "datetime",
                "datetime must be 'YYYY-MM-DD HH:MM'",
            ));
        }

        let response = self
            .reminders(ReminderRequest {
                action: ReminderAction::Set,
                message: Some(message.to_string()),
                datetime: Some(datetime.to_string()),
                reminder_id: None,
            })
            .await?;
        response.reminder.ok_or_else(|| {
            ClientError::UnexpectedResponse("'reminder' missing from set response".to_string())
        })
    }

    pub async fn list_reminders(&self) -> ClientResult<Vec<Reminder>> {
        let response = self
            .reminders(ReminderRequest {
                action: ReminderAction::List,
                message: None,
                datetime: None,
                reminder_id: None,
            })
            .await?;
        Ok(response.reminders.unwrap_or_default())
    }

    pub async fn delete_reminder(&self, reminder_id: u64) -> ClientResult<()> {
        if reminder_id == 0 {
            return Err(ClientError::validation("reminder_id", "reminder_id must be positive"));
        }
        self.reminders(ReminderRequest {
            action: ReminderAction::Delete,
            message: None,
            datetime: None,
            reminder_id: Some(reminder_id),
        })
        .await?;
        Ok(())
    }

    pub async fn check_due_reminders(&self) -> ClientResult<DueReminders> {
        self.call("/reminders/check", RequestOptions::get()).await
    }

    /// Request a PDF summary. The backend currently answers with a placeholder.
    pub async fn summarize_pdf(&self, pdf_url: &str) -> ClientResult<PdfResponse> {
        let pdf_url = require("pdf_url", pdf_url)?;
        let body = PdfRequest {
            action: "summarize".to_string(),
            pdf_url: pdf_url.to_string(),
        };
        self.call("/pdf", RequestOptions::post().json(&body)?).await
    }

    async fn reminders(&self, request: ReminderRequest) -> ClientResult<ReminderResponse> {
        self.call("/reminders", RequestOptions::post().json(&request)?)
            .await
    }
}
