use crate::client::core::ChatClient;
use crate::config::{parse_base_url, ClientConfig};
use crate::credentials::{CredentialStore, KeyringCredentials};
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Unset values come from [`ClientConfig::from_env`].
pub struct ChatClientBuilder {
    config: Option<ClientConfig>,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
    chat_path: Option<String>,
    session_base_url: Option<String>,
    request_timeout: Option<Duration>,
    strict_utf8: Option<bool>,
    credentials: Option<Arc<dyn CredentialStore>>,
}

impl ChatClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            base_url_override: None,
            chat_path: None,
            session_base_url: None,
            request_timeout: None,
            strict_utf8: None,
            credentials: None,
        }
    }

    /// Start from an explicit config instead of the environment.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the base URL for chat and session routes.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    /// Chat endpoint path relative to the base URL.
    pub fn chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = Some(path.into());
        self
    }

    /// Root for the session routes, when they are not under the base URL.
    pub fn session_base_url(mut self, url: impl Into<String>) -> Self {
        self.session_base_url = Some(url.into());
        self
    }

    /// Overall deadline per request, body included. Leave unset for long streams.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn strict_utf8(mut self, enable: bool) -> Self {
        self.strict_utf8 = Some(enable);
        self
    }

    /// Inject a credential store. Default is the OS keyring with env fallback.
    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn build(self) -> Result<ChatClient> {
        let mut config = match self.config {
            Some(config) => config,
            None => ClientConfig::from_env()?,
        };
        if let Some(base_url) = self.base_url_override {
            config.base_url = parse_base_url(&base_url)?;
        }
        if let Some(url) = self.session_base_url {
            config.session_base_url = Some(parse_base_url(&url)?);
        }
        if let Some(path) = self.chat_path {
            config.chat_path = path;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = Some(timeout);
        }
        if let Some(strict) = self.strict_utf8 {
            config.strict_utf8 = strict;
        }

        let transport = Arc::new(HttpTransport::new(&config)?);
        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(KeyringCredentials::default()));

        Ok(ChatClient {
            transport,
            config,
            credentials,
        })
    }
}

impl Default for ChatClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
