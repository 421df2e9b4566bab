//! Chat transport client.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod chat;
pub mod classify;
pub mod core;
pub mod sessions;
pub mod types;

pub use builder::ChatClientBuilder;
pub use chat::ChatRequest;
pub use classify::{classify, RawResponse, ResponseKind};
pub use core::ChatClient;
pub use sessions::SessionApi;
pub use types::{CancelHandle, ChatBody, ChatResponseMeta, ChatResult};
