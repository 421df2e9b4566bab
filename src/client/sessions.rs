//! Session and message routes.
//!
//! Plain request/response calls: no streaming, no retries. Non-2xx replies
//! become [`ChatTransportError`](crate::ChatTransportError) just like the chat call.

use crate::client::classify::RawResponse;
use crate::client::core::ChatClient;
use crate::pipeline::ChunkDecoder;
use crate::types::session::{DeletedEnvelope, MessagesEnvelope, SessionEnvelope};
use crate::types::{ApiChatMessage, ApiSession, SessionPage};
use crate::{Error, ErrorContext, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub const DEFAULT_MESSAGE_LIMIT: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Borrowed view of a [`ChatClient`] for the session routes.
pub struct SessionApi<'a> {
    client: &'a ChatClient,
    token: Option<String>,
}

impl<'a> SessionApi<'a> {
    pub(crate) fn new(client: &'a ChatClient) -> Self {
        Self {
            client,
            token: client.credentials.token(),
        }
    }

    /// Use this bearer token instead of the credential store's.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Call without an `Authorization` header.
    pub fn anonymous(mut self) -> Self {
        self.token = None;
        self
    }

    /// `GET {base}/session/{userId}`
    pub async fn get_session(&self, user_id: &str) -> Result<ApiSession> {
        let url = self.route(&["session", user_id])?;
        let envelope: SessionEnvelope = self.call(Method::GET, url, &[]).await?;
        debug!(session_id = %envelope.session.id, "[chat_transport] session result");
        Ok(envelope.session)
    }

    /// `GET {base}/session/{userId}/messages?limit=N`
    pub async fn get_session_messages(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<ApiChatMessage>> {
        let url = self.route(&["session", user_id, "messages"])?;
        let limit = limit.unwrap_or(DEFAULT_MESSAGE_LIMIT);
        let envelope: MessagesEnvelope = self
            .call(Method::GET, url, &[("limit", limit.to_string())])
            .await?;
        debug!(
            count = envelope.messages.len(),
            session_id = ?envelope.session_id,
            "[chat_transport] messages result"
        );
        Ok(envelope.messages)
    }

    /// `GET {base}/sessions/{userId}?page=P&limit=N`
    pub async fn list_sessions_by_user_id(
        &self,
        user_id: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<SessionPage> {
        let url = self.route(&["sessions", user_id])?;
        let query = [
            ("page", page.unwrap_or(1).to_string()),
            ("limit", limit.unwrap_or(DEFAULT_PAGE_SIZE).to_string()),
        ];
        self.call(Method::GET, url, &query).await
    }

    /// `GET {base}/session/{sessionId}/messages/by-id?limit=N`
    pub async fn get_messages_by_session_id(
        &self,
        session_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<ApiChatMessage>> {
        let url = self.route(&["session", session_id, "messages", "by-id"])?;
        let limit = limit.unwrap_or(DEFAULT_MESSAGE_LIMIT);
        let envelope: MessagesEnvelope = self
            .call(Method::GET, url, &[("limit", limit.to_string())])
            .await?;
        Ok(envelope.messages)
    }

    /// `POST {base}/session/{sessionId}/end`
    pub async fn end_session_by_id(&self, session_id: &str) -> Result<ApiSession> {
        let url = self.route(&["session", session_id, "end"])?;
        let envelope: SessionEnvelope = self.call(Method::POST, url, &[]).await?;
        Ok(envelope.session)
    }

    /// `DELETE {base}/session/{sessionId}`
    pub async fn delete_session_by_id(&self, session_id: &str) -> Result<bool> {
        let url = self.route(&["session", session_id])?;
        let envelope: DeletedEnvelope = self.call(Method::DELETE, url, &[]).await?;
        Ok(envelope.deleted)
    }

    /// Session base URL plus percent-encoded path segments.
    fn route(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.client.config.session_base().clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::configuration_with_context(
                    "base URL cannot carry path segments",
                    ErrorContext::new()
                        .with_field_path("config.base_url")
                        .with_source("session_api"),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(method = %method, url = %url, "[chat_transport] session call");
        let response = self
            .client
            .transport
            .execute_service(method, url, self.token.as_deref(), query)
            .await?;
        let raw = RawResponse::from_reqwest(response)
            .error_for_status(None)
            .await?
            .text(&mut ChunkDecoder::new(), None)
            .await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
