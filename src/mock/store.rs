//! In-memory state of the mock backend.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Duration as ChronoDuration, NaiveDateTime, SecondsFormat, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::api::tasks::parse_due_date;
use crate::api::{
    DocInfo, DocSyncInfo, NewTask, Reminder, SheetSyncInfo, SyncStatus, Task, TaskPriority,
    TaskStatus, TaskUpdate,
};
use crate::mock::error::MockError;

pub const DEFAULT_SHEET_ID: &str = "sheet-main";
pub const DEFAULT_SHEET_NAME: &str = "Operations";

/// One synced spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub tab_name: String,
    pub row_index: u64,
    pub data: Map<String, Value>,
    pub synced_at: String,
}

impl SheetRow {
    fn new(tab_name: &str, row_index: u64, cells: &[(&str, &str)], synced_at: &str) -> Self {
        let data = cells
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Self {
            tab_name: tab_name.to_string(),
            row_index,
            data,
            synced_at: synced_at.to_string(),
        }
    }

    /// Cell text for `column`, case-insensitive, ignoring blanks.
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .and_then(|(_, v)| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn date(&self) -> Option<&str> {
        self.cell("Date")
    }

    pub fn non_empty_fields(&self) -> usize {
        self.data
            .values()
            .filter(|v| v.as_str().map_or(!v.is_null(), |s| !s.trim().is_empty()))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct StoredDoc {
    pub info: DocInfo,
    pub content: String,
}

/// Shared mutable state behind the mock routes.
#[derive(Debug)]
pub struct MockStore {
    tasks: DashMap<u64, Task>,
    next_task_id: AtomicU64,
    docs: DashMap<String, StoredDoc>,
    next_doc_id: AtomicU64,
    reminders: DashMap<u64, Reminder>,
    next_reminder_id: AtomicU64,
    next_export_id: AtomicU64,
    sheet_sync: DashMap<String, SheetSyncInfo>,
    doc_sync: DashMap<String, DocSyncInfo>,
    rows: Vec<SheetRow>,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl MockStore {
    pub fn new() -> Self {
        Self::with_rows(seed_rows())
    }

    pub fn with_rows(rows: Vec<SheetRow>) -> Self {
        let store = Self {
            tasks: DashMap::new(),
            next_task_id: AtomicU64::new(1),
            docs: DashMap::new(),
            next_doc_id: AtomicU64::new(1),
            reminders: DashMap::new(),
            next_reminder_id: AtomicU64::new(1),
            next_export_id: AtomicU64::new(1),
            sheet_sync: DashMap::new(),
            doc_sync: DashMap::new(),
            rows,
        };

        let seeded_at = "2025-12-01T08:00:00Z";
        store.sheet_sync.insert(
            DEFAULT_SHEET_ID.to_string(),
            SheetSyncInfo {
                sheet_id: DEFAULT_SHEET_ID.to_string(),
                sheet_name: DEFAULT_SHEET_NAME.to_string(),
                last_synced: None,
                sync_status: "pending".to_string(),
                modified_time: Some(seeded_at.to_string()),
            },
        );
        store.insert_doc(
            "Operations Handbook",
            "Daily checks: inspect the ETP inlet tank, log RO feed levels, record expenses.",
            seeded_at,
        );
        store
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    // Tasks

    pub fn create_task(&self, user_id: &str, new: NewTask) -> Result<Task, MockError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(MockError::validation("title", "title cannot be empty"));
        }
        check_due_date(new.due_date.as_deref())?;

        let id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        let stamp = now();
        let task = Task {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: new.description,
            status: TaskStatus::Pending,
            priority: new.priority,
            due_date: new.due_date,
            completed_at: None,
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        self.tasks.insert(id, task.clone());
        Ok(task)
    }

    pub fn list_tasks(
        &self,
        user_id: &str,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
    ) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .filter(|t| priority.map_or(true, |p| t.priority == p))
            .map(|t| t.value().clone())
            .collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    pub fn get_task(&self, user_id: &str, id: u64) -> Result<Task, MockError> {
        self.tasks
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .map(|t| t.value().clone())
            .ok_or_else(|| task_not_found(id))
    }

    pub fn update_task(&self, user_id: &str, id: u64, update: TaskUpdate) -> Result<Task, MockError> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(MockError::validation("title", "title cannot be empty"));
            }
        }
        check_due_date(update.due_date.as_deref())?;

        let mut task = self
            .tasks
            .get_mut(&id)
            .filter(|t| t.user_id == user_id)
            .ok_or_else(|| task_not_found(id))?;

        let stamp = now();
        if let Some(title) = update.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            task.description = Some(description);
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(status) = update.status {
            if status != TaskStatus::Completed {
                task.completed_at = None;
            } else if task.status != TaskStatus::Completed {
                task.completed_at = Some(stamp.clone());
            }
            task.status = status;
        }
        task.updated_at = stamp;
        Ok(task.value().clone())
    }

    pub fn delete_task(&self, user_id: &str, id: u64) -> Result<(), MockError> {
        self.tasks
            .remove_if(&id, |_, t| t.user_id == user_id)
            .map(|_| ())
            .ok_or_else(|| task_not_found(id))
    }

    /// Open tasks due between `from` and `from + days`, soonest first.
    pub fn upcoming_tasks(&self, user_id: &str, days: u32, from: NaiveDateTime) -> Vec<Task> {
        let until = from + ChronoDuration::days(i64::from(days));
        let mut due: Vec<(NaiveDateTime, Task)> = self
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id && t.status.is_open())
            .filter_map(|t| {
                let at = parse_due_date(t.due_date.as_deref()?)?;
                (at >= from && at <= until).then(|| (at, t.value().clone()))
            })
            .collect();
        due.sort_by_key(|(at, t)| (*at, t.id));
        due.into_iter().map(|(_, t)| t).collect()
    }

    // Docs

    fn insert_doc(&self, name: &str, content: &str, modified: &str) -> DocInfo {
        let id = format!("doc-{}", self.next_doc_id.fetch_add(1, Ordering::Relaxed));
        let info = DocInfo {
            id: id.clone(),
            name: name.to_string(),
            modified_time: Some(modified.to_string()),
        };
        self.docs.insert(
            id.clone(),
            StoredDoc {
                info: info.clone(),
                content: content.to_string(),
            },
        );
        self.doc_sync.insert(
            id.clone(),
            DocSyncInfo {
                doc_id: id,
                doc_name: name.to_string(),
                last_synced: None,
                sync_status: "pending".to_string(),
                modified_time: Some(modified.to_string()),
            },
        );
        info
    }

    pub fn list_docs(&self) -> Vec<DocInfo> {
        let mut docs: Vec<DocInfo> = self.docs.iter().map(|d| d.info.clone()).collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        docs
    }

    pub fn doc(&self, id: &str) -> Result<StoredDoc, MockError> {
        self.docs
            .get(id)
            .map(|d| d.value().clone())
            .ok_or_else(|| MockError::NotFound(format!("Document {} not found", id)))
    }

    pub fn create_doc(&self, name: &str) -> DocInfo {
        self.insert_doc(name, "", &now())
    }

    /// Append to (or create) a document, returning its id.
    pub fn write_doc(
        &self,
        doc_id: Option<&str>,
        name: &str,
        content: &str,
        append: bool,
    ) -> Result<String, MockError> {
        match doc_id {
            Some(id) => {
                let mut doc = self
                    .docs
                    .get_mut(id)
                    .ok_or_else(|| MockError::NotFound(format!("Document {} not found", id)))?;
                if append && !doc.content.is_empty() {
                    doc.content.push('\n');
                    doc.content.push_str(content);
                } else {
                    doc.content = content.to_string();
                }
                doc.info.modified_time = Some(now());
                Ok(id.to_string())
            }
            None => {
                let info = self.insert_doc(name, content, &now());
                Ok(info.id)
            }
        }
    }

    pub fn next_export_id(&self) -> u64 {
        self.next_export_id.fetch_add(1, Ordering::Relaxed)
    }

    // Reminders

    pub fn set_reminder(&self, message: &str, datetime: &str) -> Reminder {
        let id = self.next_reminder_id.fetch_add(1, Ordering::Relaxed);
        let reminder = Reminder {
            id,
            message: message.to_string(),
            datetime: datetime.to_string(),
            status: "active".to_string(),
        };
        self.reminders.insert(id, reminder.clone());
        reminder
    }

    pub fn list_reminders(&self) -> Vec<Reminder> {
        let mut active: Vec<Reminder> = self
            .reminders
            .iter()
            .filter(|r| r.status == "active")
            .map(|r| r.value().clone())
            .collect();
        active.sort_by(|a, b| a.datetime.cmp(&b.datetime).then(a.id.cmp(&b.id)));
        active
    }

    pub fn delete_reminder(&self, id: u64) -> Result<(), MockError> {
        self.reminders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| MockError::NotFound(format!("Reminder {} not found", id)))
    }

    /// Mark every active reminder due at or before `now` as sent.
    pub fn take_due_reminders(&self, now: NaiveDateTime) -> Vec<Reminder> {
        let mut due = Vec::new();
        for mut entry in self.reminders.iter_mut() {
            let is_due = parse_due_date(&entry.datetime).is_some_and(|at| at <= now);
            if entry.status == "active" && is_due {
                entry.status = "sent".to_string();
                due.push(entry.value().clone());
            }
        }
        due.sort_by_key(|r| r.id);
        due
    }

    // Sync

    /// Mark sheets and/or docs synced. Unchanged files are skipped unless forced.
    pub fn sync(&self, sheets: bool, docs: bool, force: bool) -> usize {
        let stamp = now();
        let mut synced = 0;
        if sheets {
            for mut info in self.sheet_sync.iter_mut() {
                if force || needs_sync(info.last_synced.as_deref(), info.modified_time.as_deref()) {
                    info.last_synced = Some(stamp.clone());
                    info.sync_status = "synced".to_string();
                    synced += 1;
                }
            }
        }
        if docs {
            for mut info in self.doc_sync.iter_mut() {
                if force || needs_sync(info.last_synced.as_deref(), info.modified_time.as_deref()) {
                    info.last_synced = Some(stamp.clone());
                    info.sync_status = "synced".to_string();
                    synced += 1;
                }
            }
        }
        synced
    }

    pub fn sync_status(&self) -> SyncStatus {
        let mut sheets: Vec<SheetSyncInfo> = self.sheet_sync.iter().map(|s| s.value().clone()).collect();
        sheets.sort_by(|a, b| a.sheet_id.cmp(&b.sheet_id));
        let mut docs: Vec<DocSyncInfo> = self.doc_sync.iter().map(|d| d.value().clone()).collect();
        docs.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
        SyncStatus { sheets, docs }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

// RFC 3339 stamps in UTC compare correctly as strings.
fn needs_sync(last_synced: Option<&str>, modified: Option<&str>) -> bool {
    match (last_synced, modified) {
        (None, _) => true,
        (Some(last), Some(modified)) => modified > last,
        (Some(_), None) => false,
    }
}

fn task_not_found(id: u64) -> MockError {
    MockError::NotFound(format!("Task {} not found", id))
}

fn check_due_date(value: Option<&str>) -> Result<(), MockError> {
    match value {
        Some(v) if parse_due_date(v).is_none() => Err(MockError::validation(
            "due_date",
            "due_date must be 'YYYY-MM-DD' or 'YYYY-MM-DD HH:MM'",
        )),
        _ => Ok(()),
    }
}

/// Spreadsheet rows the mock answers queries from.
pub fn seed_rows() -> Vec<SheetRow> {
    let synced = "2025-12-14T06:00:00Z";
    vec![
        SheetRow::new(
            "DAILY EXPENSES",
            2,
            &[("Date", "12.12.2025"), ("Description", "Diesel for generator"), ("Amount", "45")],
            synced,
        ),
        SheetRow::new(
            "DAILY EXPENSES",
            3,
            &[("Date", "13.12.2025"), ("Description", "Antiscalant chemicals"), ("Amount", "120")],
            synced,
        ),
        SheetRow::new(
            "RO DETAILS",
            8,
            &[
                ("Date", "25.10.2025"),
                ("Time", "11:00"),
                ("Feed TDS", "473"),
                ("Filter Feed Tank Level", "32,000"),
                ("UF Feed Tank Level", "28500"),
                ("RO 1 & 2 Feed Tank Level", "45000"),
                ("RO 3 Feed Tank Level", "30000"),
                ("Salzberg Feed Tank Level", "12000"),
            ],
            synced,
        ),
        SheetRow::new(
            "RO DETAILS",
            9,
            &[
                ("Date", "26.10.2025"),
                ("Time", "11:00"),
                ("Feed TDS", "468"),
                ("Filter Feed Tank Level", "30000"),
                ("UF Feed Tank Level", "26000"),
                ("RO 1 & 2 Feed Tank Level", "41000"),
                ("RO 3 Feed Tank Level", "29000"),
                ("Salzberg Feed Tank Level", "15000"),
            ],
            synced,
        ),
    ]
}
