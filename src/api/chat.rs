//! Chat with the assistant.

use serde::{Deserialize, Serialize};

use crate::api::{require, AssistantApi};
use crate::error::ClientResult;
use crate::http::RequestOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "text".to_string()
}

impl AssistantApi {
    /// Send a chat message. Blank messages are rejected before any network call.
    pub async fn send_chat_message(&self, message: &str) -> ClientResult<ChatResponse> {
        self.send_chat_message_with_context(message, None, None).await
    }

    /// Send a chat message scoped to a sheet and/or document.
    pub async fn send_chat_message_with_context(
        &self,
        message: &str,
        sheet_id: Option<&str>,
        doc_id: Option<&str>,
    ) -> ClientResult<ChatResponse> {
        let message = require("message", message)?;

        let body = ChatRequest {
            message: message.to_string(),
            user_id: self.user_id().to_string(),
            sheet_id: sheet_id.map(str::to_string),
            doc_id: doc_id.map(str::to_string),
        };

        self.call("/chat", RequestOptions::post().json(&body)?).await
    }
}
