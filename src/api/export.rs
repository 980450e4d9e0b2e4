//! Export data, documents and conversations to Google Sheets/Docs.

use serde::{Deserialize, Serialize};

use crate::api::{require, AssistantApi};
use crate::error::ClientResult;
use crate::http::RequestOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetExport {
    /// Rows, an object, or a plain string.
    pub data: serde_json::Value,
    pub sheet_name: String,
    #[serde(default = "default_tab")]
    pub tab_name: String,
    /// Write into this sheet instead of creating one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(default)]
    pub append: bool,
}

fn default_tab() -> String {
    "Sheet1".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocExport {
    pub content: String,
    pub doc_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default = "default_append")]
    pub append: bool,
}

fn default_append() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Sheet,
    Doc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExport {
    pub conversation_id: String,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Where an export landed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
}

impl ExportResponse {
    /// Destination URL, whichever kind of file was written.
    pub fn url(&self) -> Option<&str> {
        self.sheet_url.as_deref().or(self.doc_url.as_deref())
    }
}

impl AssistantApi {
    pub async fn export_to_sheet(&self, export: &SheetExport) -> ClientResult<ExportResponse> {
        require("sheet_name", &export.sheet_name)?;
        self.call("/export/sheet", RequestOptions::post().json(export)?).await
    }

    pub async fn export_to_doc(&self, export: &DocExport) -> ClientResult<ExportResponse> {
        require("content", &export.content)?;
        require("doc_name", &export.doc_name)?;
        self.call("/export/doc", RequestOptions::post().json(export)?).await
    }

    pub async fn export_chat(&self, export: &ChatExport) -> ClientResult<ExportResponse> {
        require("conversation_id", &export.conversation_id)?;
        self.call("/export/chat", RequestOptions::post().json(export)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_prefers_sheet() {
        let response = ExportResponse {
            success: true,
            doc_url: Some("https://docs.google.com/document/d/1".into()),
            ..ExportResponse::default()
        };
        assert_eq!(response.url(), Some("https://docs.google.com/document/d/1"));
    }

    #[test]
    fn test_chat_export_wire_format() {
        let export = ChatExport {
            conversation_id: "c-1".into(),
            format: ExportFormat::Doc,
            name: None,
        };
        assert_eq!(
            serde_json::to_value(&export).unwrap(),
            json!({ "conversation_id": "c-1", "format": "doc" })
        );
    }
}
