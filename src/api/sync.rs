//! Sheet and document synchronisation.

use serde::{Deserialize, Serialize};

use crate::api::AssistantApi;
use crate::error::ClientResult;
use crate::http::RequestOptions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub message: String,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSyncInfo {
    pub sheet_id: String,
    pub sheet_name: String,
    pub last_synced: Option<String>,
    pub sync_status: String,
    pub modified_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSyncInfo {
    pub doc_id: String,
    pub doc_name: String,
    pub last_synced: Option<String>,
    pub sync_status: String,
    pub modified_time: Option<String>,
}

/// Last-sync metadata per sheet and per document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    #[serde(default)]
    pub sheets: Vec<SheetSyncInfo>,
    #[serde(default)]
    pub docs: Vec<DocSyncInfo>,
}

impl AssistantApi {
    /// Start a background sync of every sheet and document.
    pub async fn sync_all(&self, force: bool) -> ClientResult<SyncResponse> {
        self.trigger_sync("/sync/all", force).await
    }

    pub async fn sync_sheets(&self, force: bool) -> ClientResult<SyncResponse> {
        self.trigger_sync("/sync/sheets", force).await
    }

    pub async fn sync_docs(&self, force: bool) -> ClientResult<SyncResponse> {
        self.trigger_sync("/sync/docs", force).await
    }

    pub async fn get_sync_status(&self) -> ClientResult<SyncStatus> {
        self.call("/sync/status", RequestOptions::get()).await
    }

    async fn trigger_sync(&self, path: &str, force: bool) -> ClientResult<SyncResponse> {
        let options = RequestOptions::post().json(&SyncRequest { force })?;
        self.call(path, options).await
    }
}
