//! Mock HTTP server setup for integration tests

use chat_transport::{ChatClient, ClientConfig, StaticCredentials};
use mockito::{Mock, Server, ServerGuard};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CHAT_PATH: &str = "/api/chat";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Client pointed at the mock server, independent of the process environment.
    pub fn client(&self, token: Option<&str>, user_id: Option<&str>) -> ChatClient {
        ChatClient::builder()
            .config(ClientConfig::default())
            .base_url(&self.base_url)
            .chat_path(CHAT_PATH)
            .credentials(Arc::new(StaticCredentials::new(
                token.map(str::to_string),
                user_id.map(str::to_string),
            )))
            .build()
            .expect("Failed to build client")
    }

    /// Chat reply with the given content type and body
    pub async fn mock_chat(&self, status: usize, content_type: &str, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", CHAT_PATH)
            .with_status(status)
            .with_header("content-type", content_type)
            .with_body(body)
            .create_async()
            .await
    }

    /// Successful SSE reply; bare entries become `data:` frames
    pub async fn mock_sse_stream(&self, chunks: Vec<&str>) -> Mock {
        let body = chunks
            .iter()
            .map(|chunk| {
                if chunk.starts_with("data: ") || chunk.starts_with("event: ") || chunk.starts_with(':') {
                    format!("{}\n\n", chunk)
                } else {
                    format!("data: {}\n\n", chunk)
                }
            })
            .collect::<Vec<_>>()
            .join("");
        self.mock_chat(200, "text/event-stream", &body).await
    }

    /// JSON reply on a session route
    pub async fn mock_json_route(
        &self,
        method: &str,
        path: &str,
        status: usize,
        body: &str,
    ) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .match_query(mockito::Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}
