//! 类型模块：会话与消息记录。
//!
//! # Types Module
//!
//! Plain records returned by the session accessors. They are owned by the
//! caller once returned and never mutated by this crate.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ApiChatMessage`] | One stored chat message |
//! | [`ApiSession`] | A chat session |
//! | [`ApiSessionSummary`] | A listed session with message statistics |
//! | [`SessionPage`] | A page of session summaries |

pub mod session;

pub use session::{ApiChatMessage, ApiSession, ApiSessionSummary, Sender, SessionPage};
