//! Client configuration with environment overrides.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CHAT_API_BASE_URL` | `http://localhost:5000` |
//! | `CHAT_ENDPOINT_PATH` | `/api/chat` |
//! | `CHAT_SESSION_BASE_URL` | unset (session routes use `CHAT_API_BASE_URL`) |
//! | `CHAT_HTTP_CONNECT_TIMEOUT_SECS` | 10 |
//! | `CHAT_HTTP_TIMEOUT_SECS` | unset (no overall deadline) |
//! | `CHAT_HTTP_POOL_MAX_IDLE_PER_HOST` | 32 |
//! | `CHAT_HTTP_POOL_IDLE_TIMEOUT_SECS` | 90 |
//! | `CHAT_PROXY_URL` | unset |
//! | `CHAT_STRICT_UTF8` | false |

use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root for the chat endpoint and the session routes.
    pub base_url: Url,
    /// Chat endpoint path, appended to `base_url`.
    pub chat_path: String,
    /// Root for the session routes when they are mounted apart from `base_url`.
    pub session_base_url: Option<Url>,
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub proxy_url: Option<String>,
    /// Fail on malformed UTF-8 instead of substituting U+FFFD.
    pub strict_utf8: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            session_base_url: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            proxy_url: None,
            strict_utf8: false,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `CHAT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        let base_url = match lookup("CHAT_API_BASE_URL") {
            Some(raw) if !raw.trim().is_empty() => parse_base_url(raw.trim())?,
            _ => defaults.base_url,
        };
        let session_base_url = match lookup("CHAT_SESSION_BASE_URL") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_base_url(raw.trim())?),
            _ => None,
        };

        Ok(Self {
            base_url,
            chat_path: lookup("CHAT_ENDPOINT_PATH")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.chat_path),
            session_base_url,
            connect_timeout: secs("CHAT_HTTP_CONNECT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            request_timeout: secs("CHAT_HTTP_TIMEOUT_SECS").map(Duration::from_secs),
            pool_max_idle_per_host: lookup("CHAT_HTTP_POOL_MAX_IDLE_PER_HOST")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(defaults.pool_max_idle_per_host),
            pool_idle_timeout: secs("CHAT_HTTP_POOL_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.pool_idle_timeout),
            proxy_url: lookup("CHAT_PROXY_URL").filter(|s| !s.trim().is_empty()),
            strict_utf8: lookup("CHAT_STRICT_UTF8")
                .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.strict_utf8),
        })
    }

    /// Root of the session routes.
    pub fn session_base(&self) -> &Url {
        self.session_base_url.as_ref().unwrap_or(&self.base_url)
    }

    /// Absolute URL of the chat endpoint.
    pub fn chat_endpoint(&self) -> Result<Url> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.chat_path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid chat endpoint: {}", e),
                ErrorContext::new()
                    .with_field_path("config.chat_path")
                    .with_details(raw.clone())
                    .with_source("client_config"),
            )
        })
    }
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid base URL: {}", e),
            ErrorContext::new()
                .with_field_path("config.base_url")
                .with_details(raw.to_string())
                .with_source("client_config"),
        )
    })?;
    if url.cannot_be_a_base() {
        return Err(Error::configuration_with_context(
            "base URL cannot carry path segments",
            ErrorContext::new()
                .with_field_path("config.base_url")
                .with_details(raw.to_string())
                .with_source("client_config"),
        ));
    }
    Ok(url)
}
