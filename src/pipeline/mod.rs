//! 流水线处理模块：把响应体字节流转换为文本增量序列。
//!
//! # Streaming Pipeline
//!
//! Turns a response body into a pull-based sequence of text deltas.
//!
//! ```text
//! BodyReader → ChunkDecoder → ChunkFramer → ChunkStream::next_chunk()
//!     │             │              │
//!   network      UTF-8       PlainText | Sse
//!    reads     (split-safe)   framing
//! ```
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ChunkStream`] | Caller-owned, cancellable chunk sequence |
//! | [`ChunkDecoder`] | Incremental UTF-8 decoder |
//! | [`SseFrameParser`] | SSE framing with `[DONE]` / `done` sentinel |
//! | [`PlainTextStreamer`] | One chunk per network read |
//! | [`ReaderGuard`] | Releases the body reader exactly once |
//!
//! Nothing is read ahead: a network read happens only inside
//! [`ChunkStream::next_chunk`], and only when no completed frame is waiting.

pub mod decode;
pub mod plain;
pub mod sse;


pub use decode::ChunkDecoder;
pub use plain::PlainTextStreamer;
pub use sse::SseFrameParser;

use crate::client::types::CancelHandle;
use crate::transport::{BodyReader, NetworkError};
use crate::{BoxStream, Result};
use bytes::Bytes;
use futures::stream;
use tracing::debug;

/// Decoding failures.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid UTF-8 sequence at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("stream ended inside a {len}-byte UTF-8 sequence")]
    IncompleteUtf8 { len: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What a framer produces once it has enough text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Chunk(String),
    Terminate,
}

/// Turns decoded text into chunks. Implementations only buffer; they never read.
pub trait ChunkFramer: Send {
    fn push(&mut self, text: &str);

    /// Next outcome available from text pushed so far, `None` if more is needed.
    fn next_frame(&mut self) -> Option<FrameOutcome>;
}

/// Streaming wire format of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    PlainText,
    Sse,
}

impl StreamMode {
    fn framer(self) -> Box<dyn ChunkFramer> {
        match self {
            StreamMode::PlainText => Box::new(PlainTextStreamer::new()),
            StreamMode::Sse => Box::new(SseFrameParser::new()),
        }
    }
}

/// Exclusive owner of a body reader.
///
/// `release` is idempotent and also runs on drop, so the reader is released
/// exactly once on every path. Release failures are logged and dropped.
pub struct ReaderGuard {
    reader: Option<Box<dyn BodyReader>>,
}

impl ReaderGuard {
    pub fn new(reader: Box<dyn BodyReader>) -> Self {
        Self {
            reader: Some(reader),
        }
    }

    pub fn is_released(&self) -> bool {
        self.reader.is_none()
    }

    pub async fn read(&mut self) -> std::result::Result<Option<Bytes>, NetworkError> {
        match self.reader.as_mut() {
            Some(reader) => reader.read().await,
            None => Ok(None),
        }
    }

    /// Read everything that is left, honoring cancellation, then release.
    pub async fn read_to_end(
        mut self,
        decoder: &mut ChunkDecoder,
        cancel: Option<&CancelHandle>,
    ) -> Result<String> {
        let mut text = String::new();
        loop {
            match read_cancellable(&mut self, cancel).await {
                Ok(Some(bytes)) => text.push_str(&decoder.decode(&bytes, false)?),
                Ok(None) => break,
                Err(e) => {
                    self.release();
                    return Err(e.into());
                }
            }
        }
        self.release();
        text.push_str(&decoder.decode(&[], true)?);
        Ok(text)
    }

    pub fn release(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            if let Err(e) = reader.release() {
                debug!(error = %e, "[chat_transport] body reader release failed");
            }
        }
    }
}

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        self.release();
    }
}

async fn read_cancellable(
    guard: &mut ReaderGuard,
    cancel: Option<&CancelHandle>,
) -> std::result::Result<Option<Bytes>, NetworkError> {
    match cancel {
        Some(cancel) => {
            if cancel.is_cancelled() {
                return Err(NetworkError::Cancelled);
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(NetworkError::Cancelled),
                read = guard.read() => read,
            }
        }
        None => guard.read().await,
    }
}

/// A lazy, forward-only sequence of non-empty text chunks.
///
/// Pull with [`next_chunk`](Self::next_chunk). The body reader is released when
/// the sequence ends, fails, is [`close`](Self::close)d, or is dropped.
pub struct ChunkStream {
    reader: ReaderGuard,
    decoder: ChunkDecoder,
    framer: Box<dyn ChunkFramer>,
    mode: StreamMode,
    cancel: Option<CancelHandle>,
    exhausted: bool,
    finished: bool,
}

impl ChunkStream {
    pub fn new(
        reader: Box<dyn BodyReader>,
        mode: StreamMode,
        decoder: ChunkDecoder,
        cancel: Option<CancelHandle>,
    ) -> Self {
        Self {
            reader: ReaderGuard::new(reader),
            decoder,
            framer: mode.framer(),
            mode,
            cancel,
            exhausted: false,
            finished: false,
        }
    }

    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `Ok(Some(chunk))` for the next chunk, `Ok(None)` at the end.
    ///
    /// After the end or an error every further call returns `Ok(None)`
    /// without touching the network.
    pub async fn next_chunk(&mut self) -> Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            match self.framer.next_frame() {
                Some(FrameOutcome::Chunk(text)) => return Ok(Some(text)),
                Some(FrameOutcome::Terminate) => {
                    debug!("[chat_transport] stream terminated by sentinel");
                    self.close();
                    return Ok(None);
                }
                None if self.exhausted => {
                    self.close();
                    return Ok(None);
                }
                None => {}
            }

            match read_cancellable(&mut self.reader, self.cancel.as_ref()).await {
                Ok(Some(bytes)) => match self.decoder.decode(&bytes, false) {
                    Ok(text) => self.framer.push(&text),
                    Err(e) => {
                        self.close();
                        return Err(e.into());
                    }
                },
                Ok(None) => {
                    self.exhausted = true;
                    // A chunk is the text of one read; a dangling partial
                    // character never becomes a chunk of its own.
                    if let Err(e) = self.decoder.finish() {
                        self.close();
                        return Err(e.into());
                    }
                    // Unterminated SSE frames are discarded.
                    self.reader.release();
                }
                Err(e) => {
                    self.close();
                    return Err(e.into());
                }
            }
        }
    }

    /// Stop consuming and release the body reader. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.finished = true;
        self.reader.release();
    }

    /// Drain the remaining chunks into one string.
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(chunk) = self.next_chunk().await? {
            text.push_str(&chunk);
        }
        Ok(text)
    }

    /// Adapt into a [`futures::Stream`] for combinator-style consumers.
    pub fn into_stream(self) -> BoxStream<'static, String> {
        Box::pin(stream::unfold(self, |mut chunks| async move {
            match chunks.next_chunk().await {
                Ok(Some(chunk)) => Some((Ok(chunk), chunks)),
                Ok(None) => None,
                Err(e) => Some((Err(e), chunks)),
            }
        }))
    }
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("mode", &self.mode)
            .field("finished", &self.finished)
            .field("released", &self.reader.is_released())
            .finish()
    }
}
