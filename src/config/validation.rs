//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and the base URL.
//! Every failure is collected so a bad file is reported in one pass.

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.base_url '{0}' is not a valid URL")]
    InvalidBaseUrl(String),

    #[error("api.base_url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("api.user_id must not be empty")]
    EmptyUserId,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("retries.max_delay_ms ({max}) is smaller than retries.base_delay_ms ({base})")]
    CapBelowBase { base: u64, max: u64 },

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidBaseUrl(config.api.base_url.clone())),
    }

    if config.api.user_id.trim().is_empty() {
        errors.push(ValidationError::EmptyUserId);
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::Zero("timeouts.request_ms"));
    }

    if config.retries.base_delay_ms == 0 {
        errors.push(ValidationError::Zero("retries.base_delay_ms"));
    }

    if let Some(max) = config.retries.max_delay_ms {
        if max < config.retries.base_delay_ms {
            errors.push(ValidationError::CapBelowBase {
                base: config.retries.base_delay_ms,
                max,
            });
        }
    }

    if config.sync.auto_sync_enabled && config.sync.interval_secs == 0 {
        errors.push(ValidationError::Zero("sync.interval_secs"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
