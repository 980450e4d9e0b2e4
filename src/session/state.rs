//! Chat session state and its transitions.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::api::{ChatResponse, SyncStatus};

/// How long an error banner stays up before a tick clears it.
pub const ERROR_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Response type reported by the backend; `text` for user messages.
    pub kind: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBanner {
    pub message: String,
    raised_at: Instant,
}

impl ErrorBanner {
    fn expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= ERROR_DISMISS_AFTER
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The user sent a message; the reply is now pending.
    Submitted(String),
    Replied(ChatResponse),
    /// The exchange failed; carries display-ready text.
    Failed(String),
    SyncStarted,
    SyncFinished(Result<SyncStatus, String>),
    /// Periodic clock tick, expires the error banner.
    Tick,
}

/// State behind one chat surface. Only [`ChatSession::apply`] mutates it.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    pending: bool,
    syncing: bool,
    error: Option<ErrorBanner>,
    sync_status: Option<SyncStatus>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    pub fn sync_status(&self) -> Option<&SyncStatus> {
        self.sync_status.as_ref()
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Submitted(text) => {
                self.push(Role::User, text, "text".to_string());
                self.pending = true;
                self.error = None;
            }
            SessionEvent::Replied(reply) => {
                self.push(Role::Assistant, reply.response, reply.kind);
                self.pending = false;
            }
            SessionEvent::Failed(message) => {
                self.pending = false;
                self.raise(message);
            }
            SessionEvent::SyncStarted => {
                self.syncing = true;
            }
            SessionEvent::SyncFinished(result) => {
                self.syncing = false;
                match result {
                    Ok(status) => self.sync_status = Some(status),
                    Err(message) => self.raise(message),
                }
            }
            SessionEvent::Tick => {
                let now = Instant::now();
                if self.error.as_ref().is_some_and(|e| e.expired(now)) {
                    self.error = None;
                }
            }
        }
    }

    fn push(&mut self, role: Role, content: String, kind: String) {
        self.messages.push(ChatMessage {
            role,
            content,
            kind,
            at: Utc::now(),
        });
    }

    fn raise(&mut self, message: String) {
        self.error = Some(ErrorBanner {
            message,
            raised_at: Instant::now(),
        });
    }
}
