//! Cancellation ownership for calls issued on behalf of one surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::AssistantApi;

/// Owns the cancellation of every call started through it.
///
/// Closing (or dropping) the scope cancels all outstanding calls and marks
/// it dead, so results that settle afterwards are discarded by [`guard`].
///
/// [`guard`]: CallScope::guard
#[derive(Debug)]
pub struct CallScope {
    root: CancellationToken,
    alive: Arc<AtomicBool>,
}

impl CallScope {
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Token for one call; fires when the scope closes.
    pub fn token(&self) -> CancellationToken {
        self.root.child_token()
    }

    /// `api` with every call bound to this scope.
    pub fn bind(&self, api: &AssistantApi) -> AssistantApi {
        api.with_cancellation(self.token())
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        if self.alive.swap(false, Ordering::AcqRel) {
            tracing::debug!("Call scope closed, cancelling outstanding calls");
        }
        self.root.cancel();
    }

    /// `Some(value)` while the scope is alive, `None` after teardown.
    pub fn guard<T>(&self, value: T) -> Option<T> {
        self.is_alive().then_some(value)
    }
}

impl Default for CallScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CallScope {
    fn drop(&mut self) {
        self.close();
    }
}
