//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! default every field, so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the assistant client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote API location.
    pub api: ApiConfig,

    /// Per-attempt deadline.
    pub timeouts: TimeoutConfig,

    /// Retry and backoff settings.
    pub retries: RetryConfig,

    /// Background sync polling.
    pub sync: SyncConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto.
    pub base_url: String,

    /// User id sent with chat and task calls.
    pub user_id: String,

    /// Honour HTTP(S)_PROXY environment variables.
    pub system_proxy: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            user_id: "default".to_string(),
            system_proxy: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Hard deadline for a single attempt (send + body read) in milliseconds.
    /// Sized for slow backend queries.
    pub request_ms: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 120_000 }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay. `None` leaves growth unbounded.
    pub max_delay_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: Some(30_000),
        }
    }
}

/// Automatic background sync.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Poll the backend periodically.
    pub auto_sync_enabled: bool,

    /// Polling interval in seconds.
    pub interval_secs: u64,

    /// Pass `force` to every automatic sync.
    pub force: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync_enabled: false,
            interval_secs: 300,
            force: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeouts.request(), Duration::from_secs(120));
        assert_eq!(config.retries.max_retries, 3);
        assert_eq!(config.retries.base_delay_ms, 1000);
        assert!(!config.sync.auto_sync_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://assistant.example.com"

            [retries]
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://assistant.example.com");
        assert_eq!(config.api.user_id, "default");
        assert_eq!(config.retries.max_retries, 5);
        assert_eq!(config.retries.base_delay_ms, 1000);
        assert_eq!(config.timeouts.request_ms, 120_000);
    }
}
