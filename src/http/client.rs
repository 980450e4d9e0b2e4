//! Resilient request client.
//!
//! # Responsibilities
//! - Join request paths onto the configured base URL
//! - Enforce the per-attempt deadline and the caller's cancellation token
//! - Retry 5xx and transport failures with exponential backoff
//! - Buffer the response body inside the attempt
//!
//! # Design Decisions
//! - Attempts of one call are strictly sequential
//! - No state is retained between calls besides the connection pool
//! - On exhaustion the last 5xx response is returned as-is; typed callers
//!   turn it into an error

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::request::{RequestOptions, X_REQUEST_ID};
use crate::http::response::ApiResponse;
use crate::observability::metrics;
use crate::resilience::{
    run_attempt, sleep_or_cancel, Classification, Interrupted, RetryPolicy, RetryState,
};

/// HTTP client bound to one base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RequestClient {
    http: reqwest::Client,
    base_url: Url,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl RequestClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("assistant-client/", env!("CARGO_PKG_VERSION")));
        if !config.api.system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        let base_url = Url::parse(&config.api.base_url)?;

        tracing::debug!(
            base_url = %base_url,
            attempt_timeout_ms = config.timeouts.request_ms,
            max_retries = config.retries.max_retries,
            "Request client created"
        );

        Ok(Self {
            http,
            base_url,
            policy: RetryPolicy::from(&config.retries),
            attempt_timeout: config.timeouts.request(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Absolute URL for `path`, keeping any path prefix of the base URL.
    pub fn endpoint(&self, path: &str, query: &[(String, String)]) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Perform one logical request.
    ///
    /// Returns the response for any status except when every attempt failed
    /// at the transport level, the deadline elapsed, or the call was
    /// cancelled.
    pub async fn execute(&self, path: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        let url = self.endpoint(path, &options.query);
        let max_retries = options.max_retries.unwrap_or(self.policy.max_retries);
        let cancel = options.cancel.clone().unwrap_or_default();
        let request_id = Uuid::new_v4().to_string();
        let method = options.method.clone();
        let start = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                attempt,
                "Sending request"
            );

            let settled = run_attempt(
                self.send_once(&url, &options, &request_id),
                self.attempt_timeout,
                &cancel,
            )
            .await;

            let (classification, result) = match settled {
                Ok(Ok(response)) => (Classification::from_status(response.status), Ok(response)),
                Ok(Err(err)) if err.is_timeout() => (
                    Classification::TimedOut,
                    Err(ClientError::Timeout(self.attempt_timeout)),
                ),
                Ok(Err(err)) => (Classification::NetworkError, Err(ClientError::Network(err))),
                Err(Interrupted::Deadline(after)) => {
                    (Classification::TimedOut, Err(ClientError::Timeout(after)))
                }
                Err(Interrupted::Cancelled) => (Classification::Cancelled, Err(ClientError::Cancelled)),
            };

            metrics::record_attempt(&method, classification);

            match self.policy.transition(attempt, max_retries, classification) {
                RetryState::Backoff { delay, .. } => {
                    tracing::warn!(
                        request_id = %request_id,
                        path = %path,
                        attempt,
                        outcome = %describe(&result),
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request"
                    );
                    metrics::record_retry(&method);

                    if sleep_or_cancel(delay, &cancel).await.is_err() {
                        tracing::info!(request_id = %request_id, path = %path, "Request cancelled during backoff");
                        metrics::record_request(&method, Classification::Cancelled, start);
                        return Err(ClientError::Cancelled);
                    }
                    attempt += 1;
                }
                terminal => {
                    match terminal {
                        RetryState::Succeeded => tracing::debug!(
                            request_id = %request_id,
                            path = %path,
                            attempts = attempt + 1,
                            "Request succeeded"
                        ),
                        RetryState::Cancelled => tracing::info!(
                            request_id = %request_id,
                            path = %path,
                            "Request cancelled"
                        ),
                        _ => tracing::warn!(
                            request_id = %request_id,
                            path = %path,
                            attempts = attempt + 1,
                            outcome = %describe(&result),
                            "Request failed"
                        ),
                    }
                    metrics::record_request(&method, classification, start);
                    return result;
                }
            }
        }
    }

    async fn send_once(
        &self,
        url: &Url,
        options: &RequestOptions,
        request_id: &str,
    ) -> Result<ApiResponse, reqwest::Error> {
        let mut request = self
            .http
            .request(options.method.clone(), url.clone())
            .headers(options.headers.clone())
            .header(X_REQUEST_ID, request_id);

        if let Some(body) = &options.body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        Ok(ApiResponse {
            status,
            body,
            request_id: request_id.to_string(),
        })
    }
}

fn describe(result: &ClientResult<ApiResponse>) -> String {
    match result {
        Ok(response) => response.status.to_string(),
        Err(err) => err.to_string(),
    }
}
