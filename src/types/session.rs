//! Chat session records returned by the session REST routes

use serde::{Deserialize, Serialize};

/// Who authored a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Chatbot,
    Tool,
    System,
}

/// One stored chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiChatMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub chat_session_id: String,
    pub sender: Sender,
    pub message: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSession {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub session_started: String,
    #[serde(default)]
    pub session_ended: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ApiSession {
    pub fn is_ended(&self) -> bool {
        self.session_ended.is_some()
    }
}

/// A session as listed, with message statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSessionSummary {
    #[serde(flatten)]
    pub session: ApiSession,
    #[serde(rename = "messageCount", default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<u64>,
    #[serde(rename = "lastMessageAt", default, skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<String>,
}

/// One page of [`ApiSessionSummary`] records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPage {
    pub total: u64,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    pub pages: u32,
    pub sessions: Vec<ApiSessionSummary>,
}

// Response envelopes.

#[derive(Debug, Deserialize)]
pub(crate) struct SessionEnvelope {
    pub session: ApiSession,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesEnvelope {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<ApiChatMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeletedEnvelope {
    #[serde(default)]
    pub deleted: bool,
}
