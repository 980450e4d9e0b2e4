//! Timeout enforcement and cancellation.
//!
//! The caller's token and the per-attempt deadline are raced against the
//! operation; whichever fires first drops the operation future, which aborts
//! the underlying request.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Why an operation did not run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Deadline(Duration),
    Cancelled,
}

/// Run `operation` until it settles, the deadline elapses, or `cancel` fires.
pub async fn run_attempt<F, T>(
    operation: F,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<T, Interrupted>
where
    F: Future<Output = T>,
{
    if cancel.is_cancelled() {
        return Err(Interrupted::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupted::Cancelled),
        result = tokio::time::timeout(deadline, operation) => {
            result.map_err(|_| Interrupted::Deadline(deadline))
        }
    }
}

/// Sleep for `delay` unless `cancel` fires first.
pub async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<(), Interrupted> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupted::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
