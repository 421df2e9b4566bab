//! Response classification: status, headers and content type decide how the
//! body is consumed.

use crate::client::types::{CancelHandle, ChatBody, ChatResponseMeta, ChatResult};
use crate::error::ChatTransportError;
use crate::pipeline::{ChunkDecoder, ChunkStream, ReaderGuard, StreamMode};
use crate::transport::{BodyReader, ReqwestBodyReader};
use crate::Result;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const SESSION_ID_HEADER: &str = "x-chat-session-id";

/// Placeholder text for a single-shot reply that resolves to nothing.
pub const EMPTY_REPLY: &str = "(empty response)";

/// A response whose status and headers have arrived but whose body is unread.
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` for statuses that never carry a body.
    pub body: Option<Box<dyn BodyReader>>,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Option<Box<dyn BodyReader>>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body: Option<Box<dyn BodyReader>> = if is_null_body_status(status) {
            None
        } else {
            Some(Box::new(ReqwestBodyReader::new(response)))
        };
        Self::new(status, headers, body)
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    }

    pub fn meta(&self) -> ChatResponseMeta {
        ChatResponseMeta {
            new_user_id: self.header(USER_ID_HEADER),
            new_session_id: self.header(SESSION_ID_HEADER),
            content_type: self.header(CONTENT_TYPE.as_str()).unwrap_or_default(),
        }
    }

    /// Read the whole body as text, then release the reader.
    pub async fn text(self, decoder: &mut ChunkDecoder, cancel: Option<&CancelHandle>) -> Result<String> {
        match self.body {
            Some(reader) => ReaderGuard::new(reader).read_to_end(decoder, cancel).await,
            None => Ok(String::new()),
        }
    }

    /// Pass 2xx responses through; turn anything else into a
    /// [`ChatTransportError`] carrying the best-effort body text.
    ///
    /// Cancellation while the error body is read wins over the status.
    pub async fn error_for_status(self, cancel: Option<&CancelHandle>) -> Result<Self> {
        if self.status.is_success() {
            return Ok(self);
        }
        let status = self.status;
        let headers = self.headers.clone();
        let body = match self.text(&mut ChunkDecoder::new(), cancel).await {
            Ok(body) => body,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                debug!(error = %e, "[chat_transport] error body unreadable");
                String::new()
            }
        };
        Err(ChatTransportError::new(status, headers, body).into())
    }
}

fn is_null_body_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
    )
}

/// How a successful reply body is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    PlainText,
    Sse,
}

impl ResponseKind {
    pub fn classify(content_type: &str, has_body: bool) -> Self {
        if !has_body || content_type.contains("application/json") {
            ResponseKind::Json
        } else if content_type.contains("text/event-stream") {
            ResponseKind::Sse
        } else {
            ResponseKind::PlainText
        }
    }
}

/// Text of a single-shot reply: `reply`, then `message`, then the whole
/// document. Unparseable bodies are returned verbatim.
pub fn resolve_json_text(raw: &str) -> String {
    let text = match serde_json::from_str::<Value>(raw) {
        Ok(doc) => {
            let field = |name: &str| match doc.get(name) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            };
            field("reply")
                .or_else(|| field("message"))
                .unwrap_or_else(|| doc.to_string())
        }
        Err(_) => raw.to_string(),
    };
    if text.is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        text
    }
}

/// Turn a raw response into a [`ChatResult`], or fail with the non-2xx reply.
pub async fn classify(
    response: RawResponse,
    cancel: Option<CancelHandle>,
    strict_utf8: bool,
) -> Result<ChatResult> {
    let meta = response.meta();
    info!(
        status = response.status.as_u16(),
        content_type = %meta.content_type,
        new_user_id = ?meta.new_user_id,
        new_session_id = ?meta.new_session_id,
        "[chat_transport] response"
    );

    let response = response.error_for_status(cancel.as_ref()).await?;
    let decoder = if strict_utf8 {
        ChunkDecoder::strict()
    } else {
        ChunkDecoder::new()
    };

    let kind = ResponseKind::classify(&meta.content_type, response.body.is_some());
    let body = match (kind, response.body) {
        (ResponseKind::Sse, Some(reader)) => {
            debug!("[chat_transport] streaming mode sse");
            ChatBody::Stream(ChunkStream::new(reader, StreamMode::Sse, decoder, cancel))
        }
        (ResponseKind::PlainText, Some(reader)) => {
            debug!("[chat_transport] streaming mode plain");
            ChatBody::Stream(ChunkStream::new(reader, StreamMode::PlainText, decoder, cancel))
        }
        // Json, or nothing to stream.
        (_, reader) => {
            debug!("[chat_transport] non-stream JSON reply");
            let mut decoder = decoder;
            let raw = match reader {
                Some(reader) => {
                    ReaderGuard::new(reader)
                        .read_to_end(&mut decoder, cancel.as_ref())
                        .await?
                }
                None => String::new(),
            };
            ChatBody::Json(resolve_json_text(&raw))
        }
    };

    Ok(ChatResult { meta, body })
}
