use crate::client::chat::ChatRequest;
use crate::client::classify::{classify, RawResponse};
use crate::client::sessions::SessionApi;
use crate::client::types::{CancelHandle, ChatResult};
use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::transport::{HttpTransport, NetworkError};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Chat transport client: dispatches chat requests and exposes the session routes.
pub struct ChatClient {
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) config: ClientConfig,
    pub(crate) credentials: Arc<dyn CredentialStore>,
}

impl ChatClient {
    /// Client configured from `CHAT_*` environment variables.
    pub fn new() -> Result<Self> {
        crate::client::builder::ChatClientBuilder::new().build()
    }

    pub fn builder() -> crate::client::builder::ChatClientBuilder {
        crate::client::builder::ChatClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// A request for the configured chat endpoint, with token and user id
    /// filled in from the credential store.
    pub fn request(&self, message: impl Into<String>) -> Result<ChatRequest> {
        let endpoint = self.config.chat_endpoint()?;
        let mut req = ChatRequest::new(endpoint.as_str(), message);
        if let Some(token) = self.credentials.token() {
            req = req.token(token);
        }
        if let Some(user_id) = self.credentials.user_id() {
            req = req.user_id(user_id);
        }
        Ok(req)
    }

    /// Send one message to the configured endpoint.
    ///
    /// A user id assigned by the server (`x-user-id`) is written back to the
    /// credential store.
    pub async fn send_message(
        &self,
        message: impl Into<String>,
        cancel: Option<CancelHandle>,
    ) -> Result<ChatResult> {
        let mut req = self.request(message)?;
        if let Some(cancel) = cancel {
            req = req.cancel_handle(cancel);
        }
        let result = self.start_chat(req).await?;
        if let Some(user_id) = &result.meta.new_user_id {
            if self.credentials.user_id().as_deref() != Some(user_id.as_str()) {
                debug!(user_id = %user_id, "[chat_transport] storing server-assigned user id");
                self.credentials.set_user_id(user_id);
            }
        }
        Ok(result)
    }

    /// Dispatch and classify in one step.
    pub async fn start_chat(&self, request: ChatRequest) -> Result<ChatResult> {
        let response = self.dispatch(&request).await?;
        classify(response, request.cancel, self.config.strict_utf8).await
    }

    /// Send the chat POST. Fails with [`NetworkError::Cancelled`] when the
    /// handle fires before the response headers arrive.
    pub async fn dispatch(&self, request: &ChatRequest) -> Result<RawResponse> {
        let url = Url::parse(&request.endpoint).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid chat endpoint: {}", e),
                ErrorContext::new()
                    .with_field_path("request.endpoint")
                    .with_details(request.endpoint.clone())
                    .with_source("chat_dispatcher"),
            )
        })?;

        info!(
            endpoint = %url,
            has_user_id = request.user_id.is_some(),
            msg_chars = request.message.chars().count(),
            "[chat_transport] POST"
        );

        let body = request.body();
        let send = self
            .transport
            .post_chat(url, &body, request.token.as_deref());

        let response = match &request.cancel {
            Some(cancel) => {
                if cancel.is_cancelled() {
                    return Err(NetworkError::Cancelled.into());
                }
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(NetworkError::Cancelled),
                    res = send => res,
                }
            }
            None => send.await,
        }?;

        Ok(RawResponse::from_reqwest(response))
    }

    /// Session and message routes under [`ClientConfig::session_base`].
    pub fn sessions(&self) -> SessionApi<'_> {
        SessionApi::new(self)
    }
}
