use crate::client::types::CancelHandle;
use serde_json::{Map, Value};

/// One chat submission.
///
/// Built per user message and consumed by
/// [`ChatClient::start_chat`](crate::client::ChatClient::start_chat).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub endpoint: String,
    pub message: String,
    pub user_id: Option<String>,
    pub token: Option<String>,
    pub extra_body: Map<String, Value>,
    pub cancel: Option<CancelHandle>,
}

impl ChatRequest {
    pub fn new(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            message: message.into(),
            user_id: None,
            token: None,
            extra_body: Map::new(),
            cancel: None,
        }
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Bearer token for the `Authorization` header.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add one extension field to the JSON body.
    pub fn extra_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra_body.insert(key.into(), value);
        self
    }

    pub fn extra_body(mut self, extra: Map<String, Value>) -> Self {
        self.extra_body.extend(extra);
        self
    }

    pub fn cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// `{message, userId, ...extra}`. Extension fields are applied last and
    /// win over `message`/`userId` on a name clash.
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("message".into(), Value::String(self.message.clone()));
        body.insert(
            "userId".into(),
            self.user_id.clone().map(Value::String).unwrap_or(Value::Null),
        );
        for (k, v) in &self.extra_body {
            body.insert(k.clone(), v.clone());
        }
        Value::Object(body)
    }
}
