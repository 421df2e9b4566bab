//! # chat-transport
//!
//! 流式聊天传输客户端：把 JSON、纯文本和 SSE 三种回复统一为可取消的文本增量序列。
//!
//! Streaming chat transport client. A chat message is POSTed to a backend
//! endpoint; the reply is classified by its headers as a single JSON object,
//! raw incremental text, or Server-Sent-Events, and handed back either as one
//! text or as a cancellable, pull-based [`ChunkStream`] of text deltas.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chat_transport::{CancelHandle, ChatBody, ChatClient};
//!
//! #[tokio::main]
//! async fn main() -> chat_transport::Result<()> {
//!     let client = ChatClient::builder()
//!         .base_url("http://localhost:5000")
//!         .build()?;
//!
//!     let cancel = CancelHandle::new();
//!     let reply = client.send_message("Recommend a co-op game", Some(cancel)).await?;
//!
//!     match reply.body {
//!         ChatBody::Json(text) => println!("{text}"),
//!         ChatBody::Stream(mut chunks) => {
//!             while let Some(delta) = chunks.next_chunk().await? {
//!                 print!("{delta}");
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Dispatcher, response classifier and session accessors |
//! | [`pipeline`] | Chunk decoding, SSE framing and the chunk stream |
//! | [`transport`] | reqwest transport and the body-reader seam |
//! | [`config`] | Client configuration with env overrides |
//! | [`credentials`] | Credential store seam |
//! | [`types`] | Session and message records |

pub mod client;
pub mod config;
pub mod credentials;
pub mod pipeline;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{
    CancelHandle, ChatBody, ChatClient, ChatClientBuilder, ChatRequest, ChatResponseMeta,
    ChatResult, RawResponse, ResponseKind,
};
pub use config::ClientConfig;
pub use credentials::{CredentialStore, KeyringCredentials, StaticCredentials};
pub use pipeline::{ChunkDecoder, ChunkStream, DecodeError, StreamMode};
pub use transport::{BodyReader, NetworkError};
pub use types::{ApiChatMessage, ApiSession, ApiSessionSummary, Sender, SessionPage};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{ChatTransportError, Error, ErrorContext};
