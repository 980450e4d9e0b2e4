//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Logical request:
//!     → timeouts.rs (race attempt against deadline and caller token)
//!     → retries.rs (classify outcome, pick next state)
//!     → backoff.rs (delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Every attempt has a deadline
//! - Only 5xx and transport failures are retried
//! - Cancellation is terminal, the deadline is attempt-local
//! - No jitter; delays are deterministic

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::calculate_backoff;
pub use retries::{Classification, RetryPolicy, RetryState};
pub use timeouts::{run_attempt, sleep_or_cancel, Interrupted};
