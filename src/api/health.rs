use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::AssistantApi;
use crate::error::ClientResult;
use crate::http::RequestOptions;

/// Backend liveness and per-dependency checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub checks: BTreeMap<String, serde_json::Value>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

impl AssistantApi {
    /// Health probe. Never retried, so a down backend is reported promptly.
    pub async fn health(&self) -> ClientResult<HealthReport> {
        self.call("/health", RequestOptions::get().max_retries(0)).await
    }
}
