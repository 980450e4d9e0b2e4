//! Task CRUD.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::api::{require, require_opt, AssistantApi};
use crate::error::{ClientError, ClientResult};
use crate::http::RequestOptions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Overdue,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Finished tasks never show up as upcoming.
    pub fn is_open(self) -> bool {
        !matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingTasks {
    pub tasks: Vec<Task>,
    pub days: u32,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    success: bool,
}

/// Parse a due date in either accepted format.
pub fn parse_due_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn check_due_date(value: Option<&str>) -> ClientResult<()> {
    match value {
        Some(v) if parse_due_date(v).is_none() => Err(ClientError::validation(
            "due_date",
            "due_date must be 'YYYY-MM-DD' or 'YYYY-MM-DD HH:MM'",
        )),
        _ => Ok(()),
    }
}

impl AssistantApi {
    pub async fn create_task(&self, task: &NewTask) -> ClientResult<Task> {
        let title = require("title", &task.title)?;
        check_due_date(task.due_date.as_deref())?;

        let body = NewTask {
            title: title.to_string(),
            ..task.clone()
        };
        let options = RequestOptions::post()
            .query("user_id", self.user_id())
            .json(&body)?;
        self.call("/tasks", options).await
    }

    pub async fn list_tasks(
        &self,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
    ) -> ClientResult<TaskList> {
        let options = RequestOptions::get()
            .query("user_id", self.user_id())
            .query_opt("status", status)
            .query_opt("priority", priority);
        self.call("/tasks", options).await
    }

    pub async fn get_task(&self, id: u64) -> ClientResult<Task> {
        let options = RequestOptions::get().query("user_id", self.user_id());
        self.call(&format!("/tasks/{}", id), options).await
    }

    pub async fn update_task(&self, id: u64, update: &TaskUpdate) -> ClientResult<Task> {
        let title = require_opt("title", update.title.as_deref())?;
        check_due_date(update.due_date.as_deref())?;

        let body = TaskUpdate {
            title: title.map(str::to_string),
            ..update.clone()
        };
        let options = RequestOptions::put()
            .query("user_id", self.user_id())
            .json(&body)?;
        self.call(&format!("/tasks/{}", id), options).await
    }

    pub async fn delete_task(&self, id: u64) -> ClientResult<()> {
        let options = RequestOptions::delete().query("user_id", self.user_id());
        let response: DeleteResponse = self.call(&format!("/tasks/{}", id), options).await?;
        if response.success {
            Ok(())
        } else {
            Err(ClientError::UnexpectedResponse(format!(
                "server did not confirm deletion of task {}",
                id
            )))
        }
    }

    /// Open tasks due within the next `days` days.
    pub async fn get_upcoming_tasks(&self, days: u32) -> ClientResult<UpcomingTasks> {
        let options = RequestOptions::get()
            .query("user_id", self.user_id())
            .query("days", days);
        self.call("/tasks/upcoming", options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_due_date_formats() {
        assert!(parse_due_date("2025-12-12").is_some());
        assert!(parse_due_date("2025-12-12 09:30").is_some());
        assert!(parse_due_date("12/12/2025").is_none());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), json!("in_progress"));
        assert_eq!(serde_json::to_value(TaskPriority::Urgent).unwrap(), json!("urgent"));
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let update = TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..TaskUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "status": "completed" }));
    }

    #[test]
    fn test_new_task_defaults_priority() {
        let task: NewTask = serde_json::from_value(json!({ "title": "Call vendor" })).unwrap();
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(NewTask::new("x").priority, TaskPriority::Medium);
    }
}
