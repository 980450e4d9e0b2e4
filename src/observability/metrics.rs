//! Client metrics.
//!
//! # Metrics
//! - `assistant_client_attempts_total` (counter): attempts by method, outcome
//! - `assistant_client_retries_total` (counter): backoff transitions by method
//! - `assistant_client_request_duration_seconds` (histogram): logical call latency
//!
//! Emitted through the `metrics` facade; nothing is recorded until the
//! embedding application installs a recorder.

use std::time::Instant;

use reqwest::Method;

use crate::resilience::Classification;

pub const ATTEMPTS_TOTAL: &str = "assistant_client_attempts_total";
pub const RETRIES_TOTAL: &str = "assistant_client_retries_total";
pub const REQUEST_DURATION: &str = "assistant_client_request_duration_seconds";

pub fn record_attempt(method: &Method, outcome: Classification) {
    metrics::counter!(
        ATTEMPTS_TOTAL,
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_retry(method: &Method) {
    metrics::counter!(RETRIES_TOTAL, "method" => method.to_string()).increment(1);
}

/// Record the latency of a whole logical call, retries included.
pub fn record_request(method: &Method, outcome: Classification, start: Instant) {
    metrics::histogram!(
        REQUEST_DURATION,
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}
