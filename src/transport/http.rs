use crate::config::ClientConfig;
use crate::transport::{BodyReader, NetworkError};
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Proxy};
use url::Url;

/// `Accept` value sent with chat requests, in order of preference.
pub const CHAT_ACCEPT: &str = "text/event-stream, text/plain, application/json";

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout));

        // Streams are long-lived, so an overall deadline is opt-in only.
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy URL: {}", e),
                    ErrorContext::new()
                        .with_field_path("CHAT_PROXY_URL")
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Network(NetworkError::Other(e.to_string())))?;

        Ok(Self { client })
    }

    /// POST a chat body, asking for any of the three reply formats.
    pub async fn post_chat(
        &self,
        url: Url,
        body: &serde_json::Value,
        token: Option<&str>,
    ) -> std::result::Result<reqwest::Response, NetworkError> {
        let mut req = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, CHAT_ACCEPT)
            .json(body);

        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        req.send().await.map_err(NetworkError::Http)
    }

    /// Plain request/response call used by the session accessors.
    pub async fn execute_service(
        &self,
        method: Method,
        url: Url,
        token: Option<&str>,
        query_params: &[(&str, String)],
    ) -> std::result::Result<reqwest::Response, NetworkError> {
        let with_json_body = method == Method::POST;
        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");

        if with_json_body {
            request = request.header(CONTENT_TYPE, "application/json");
        }

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        if !query_params.is_empty() {
            request = request.query(query_params);
        }

        request.send().await.map_err(NetworkError::Http)
    }
}

/// [`BodyReader`] over a live reqwest response.
///
/// Releasing drops the response, which hands the connection back to the pool
/// (or closes it when the body was not fully read).
pub struct ReqwestBodyReader {
    response: Option<reqwest::Response>,
}

impl ReqwestBodyReader {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            response: Some(response),
        }
    }
}

#[async_trait::async_trait]
impl BodyReader for ReqwestBodyReader {
    async fn read(&mut self) -> std::result::Result<Option<Bytes>, NetworkError> {
        match self.response.as_mut() {
            Some(response) => response.chunk().await.map_err(NetworkError::Http),
            None => Err(NetworkError::Other("body reader already released".into())),
        }
    }

    fn release(&mut self) -> std::result::Result<(), NetworkError> {
        self.response.take();
        Ok(())
    }
}
