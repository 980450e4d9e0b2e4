//! Google Docs operations behind the action-discriminated `POST /docs`.

use serde::{Deserialize, Serialize};

use crate::api::{require, AssistantApi};
use crate::error::{ClientError, ClientResult};
use crate::http::RequestOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocAction {
    List,
    Read,
    Create,
    Summarize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRequest {
    pub action: DocAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocInfo {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

/// One field is populated, depending on the action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Vec<DocInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<DocInfo>,
}

fn missing(field: &str, action: DocAction) -> ClientError {
    ClientError::UnexpectedResponse(format!("'{}' missing from {:?} response", field, action))
}

impl AssistantApi {
    pub async fn list_docs(&self) -> ClientResult<Vec<DocInfo>> {
        let response = self.docs(DocAction::List, None, None).await?;
        response.docs.ok_or_else(|| missing("docs", DocAction::List))
    }

    pub async fn read_doc(&self, doc_id: &str) -> ClientResult<String> {
        let doc_id = require("doc_id", doc_id)?;
        let response = self.docs(DocAction::Read, Some(doc_id), None).await?;
        response.content.ok_or_else(|| missing("content", DocAction::Read))
    }

    pub async fn create_doc(&self, doc_name: &str) -> ClientResult<DocInfo> {
        let doc_name = require("doc_name", doc_name)?;
        let response = self.docs(DocAction::Create, None, Some(doc_name)).await?;
        response.doc.ok_or_else(|| missing("doc", DocAction::Create))
    }

    pub async fn summarize_doc(&self, doc_id: &str) -> ClientResult<String> {
        let doc_id = require("doc_id", doc_id)?;
        let response = self.docs(DocAction::Summarize, Some(doc_id), None).await?;
        response
            .summary
            .ok_or_else(|| missing("summary", DocAction::Summarize))
    }

    async fn docs(
        &self,
        action: DocAction,
        doc_id: Option<&str>,
        doc_name: Option<&str>,
    ) -> ClientResult<DocResponse> {
        let body = DocRequest {
            action,
            doc_id: doc_id.map(str::to_string),
            doc_name: doc_name.map(str::to_string),
        };
        self.call("/docs", RequestOptions::post().json(&body)?).await
    }
}
