use crate::pipeline::ChunkStream;
use tokio_util::sync::CancellationToken;

/// Caller-side cancellation for one chat request.
///
/// Clones share state: cancelling any clone aborts the in-flight request and
/// any pending read of the resulting chunk stream.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Metadata read once from the reply headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatResponseMeta {
    /// `x-user-id`: set when the server assigned or confirmed a user id.
    pub new_user_id: Option<String>,
    /// `x-chat-session-id`
    pub new_session_id: Option<String>,
    /// `content-type`, empty when absent.
    pub content_type: String,
}

/// The reply body: a single text or a chunk stream, never both.
#[derive(Debug)]
pub enum ChatBody {
    Json(String),
    Stream(ChunkStream),
}

/// Result of a successful chat call.
#[derive(Debug)]
pub struct ChatResult {
    pub meta: ChatResponseMeta,
    pub body: ChatBody,
}

impl ChatResult {
    pub fn json_text(&self) -> Option<&str> {
        match &self.body {
            ChatBody::Json(text) => Some(text),
            ChatBody::Stream(_) => None,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.body, ChatBody::Stream(_))
    }

    pub fn into_stream(self) -> Option<ChunkStream> {
        match self.body {
            ChatBody::Stream(stream) => Some(stream),
            ChatBody::Json(_) => None,
        }
    }

    /// Full reply text, draining the stream if there is one.
    pub async fn into_text(self) -> crate::Result<String> {
        match self.body {
            ChatBody::Json(text) => Ok(text),
            ChatBody::Stream(stream) => stream.collect_text().await,
        }
    }
}
