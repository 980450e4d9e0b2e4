//! Retry logic.
//!
//! # State Transitions
//! ```text
//! Attempting → Succeeded        2xx
//! Attempting → FailedPermanent  4xx / other non-5xx, timeout, budget exhausted
//! Attempting → Backoff          5xx or network error with budget remaining
//! Backoff    → Attempting       delay elapsed
//! any        → Cancelled        caller token fired
//! ```

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// How a single settled attempt is treated by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    ClientError,
    ServerError,
    NetworkError,
    TimedOut,
    Cancelled,
}

impl Classification {
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            Classification::Success
        } else if status.is_server_error() {
            Classification::ServerError
        } else {
            Classification::ClientError
        }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Classification::ServerError | Classification::NetworkError
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::ClientError => "client_error",
            Classification::ServerError => "server_error",
            Classification::NetworkError => "network_error",
            Classification::TimedOut => "timeout",
            Classification::Cancelled => "cancelled",
        }
    }
}

/// Position of one logical request in the retry state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// An attempt is in flight. Never returned by [`RetryPolicy::transition`];
    /// the client loop re-enters it after every backoff.
    Attempting { attempt: u32 },
    Backoff { attempt: u32, delay: Duration },
    Succeeded,
    FailedPermanent,
    Cancelled,
}

/// Backoff parameters shared by every call of a client.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Option<Duration>) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Decide the next state after `attempt` (zero-indexed) settled as `outcome`.
    pub fn transition(&self, attempt: u32, max_retries: u32, outcome: Classification) -> RetryState {
        match outcome {
            Classification::Success => RetryState::Succeeded,
            Classification::Cancelled => RetryState::Cancelled,
            _ if outcome.is_retryable() && attempt < max_retries => RetryState::Backoff {
                attempt,
                delay: calculate_backoff(attempt, self.base_delay, self.max_delay),
            },
            _ => RetryState::FailedPermanent,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.base_delay_ms),
            config.max_delay_ms.map(Duration::from_millis),
        )
    }
}
