//! Session state for a chat surface.
//!
//! # Data Flow
//! ```text
//! user text → send_message
//!     → Submitted → AssistantApi (bound to the CallScope)
//!     → scope alive? → Replied / Failed
//!     → scope closed → result dropped
//!
//! sync request → SyncStarted → sync_all + get_sync_status
//!     → SyncFinished (unless the scope closed first)
//! ```

pub mod state;

pub use state::{ChatMessage, ChatSession, Role, SessionEvent, ERROR_DISMISS_AFTER};

use crate::api::{require, AssistantApi, ChatResponse, SyncStatus};
use crate::error::ClientResult;
use crate::lifecycle::CallScope;

/// Drive one chat exchange and fold its outcome into `session`.
///
/// Blank input is rejected without touching the session. The outcome is
/// applied only if `scope` is still alive when the call settles.
pub async fn send_message(
    session: &mut ChatSession,
    api: &AssistantApi,
    scope: &CallScope,
    text: &str,
) -> ClientResult<ChatResponse> {
    let text = require("message", text)?;
    session.apply(SessionEvent::Submitted(text.to_string()));

    let result = scope.bind(api).send_chat_message(text).await;

    match scope.guard(&result) {
        Some(Ok(reply)) => session.apply(SessionEvent::Replied(reply.clone())),
        Some(Err(e)) => {
            tracing::warn!(error = %e, kind = ?e.kind(), "Chat exchange failed");
            session.apply(SessionEvent::Failed(e.user_message()));
        }
        None => tracing::debug!("Chat result arrived after scope teardown, discarded"),
    }
    result
}

/// Trigger a full sync, then fold the refreshed status into `session`.
///
/// Like [`send_message`], the outcome is dropped if `scope` closed while
/// the calls were in flight.
pub async fn sync(
    session: &mut ChatSession,
    api: &AssistantApi,
    scope: &CallScope,
    force: bool,
) -> ClientResult<SyncStatus> {
    session.apply(SessionEvent::SyncStarted);

    let api = scope.bind(api);
    let result = match api.sync_all(force).await {
        Ok(started) => {
            tracing::debug!(message = %started.message, force, "Sync triggered");
            api.get_sync_status().await
        }
        Err(e) => Err(e),
    };

    match scope.guard(&result) {
        Some(Ok(status)) => session.apply(SessionEvent::SyncFinished(Ok(status.clone()))),
        Some(Err(e)) => {
            tracing::warn!(error = %e, kind = ?e.kind(), "Sync failed");
            session.apply(SessionEvent::SyncFinished(Err(e.user_message())));
        }
        None => tracing::debug!("Sync result arrived after scope teardown, discarded"),
    }
    result
}
