//! Integration tests for non-2xx replies and transport failures

use crate::mock_server::MockServerFixture;
use chat_transport::{ChatRequest, Error};
use reqwest::StatusCode;

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_chat(500, "application/json", r#"{"error":"boom"}"#)
        .await;

    let client = fixture.client(None, None);
    let err = client.send_message("hi", None).await.unwrap_err();

    match err {
        Error::Transport(transport) => {
            assert_eq!(transport.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(transport.status_text, "Internal Server Error");
            assert!(transport.body.contains("boom"));
            assert!(transport.to_string().starts_with("HTTP 500 Internal Server Error :: "));
        }
        other => panic!("expected a transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_streaming_content_type_does_not_matter_for_errors() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_chat(401, "text/event-stream", "data: unauthorized\n\n")
        .await;

    let client = fixture.client(Some("expired"), None);
    let err = client.send_message("hi", None).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_network_error() {
    let fixture = MockServerFixture::new().await;
    let client = fixture.client(None, None);

    // Port 9 (discard) on localhost is not served in test environments.
    let request = ChatRequest::new("http://127.0.0.1:9/api/chat", "hi");
    let err = client.start_chat(request).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(!err.is_cancelled());
}

#[tokio::test]
async fn test_malformed_endpoint_is_a_configuration_error() {
    let fixture = MockServerFixture::new().await;
    let client = fixture.client(None, None);

    let err = client
        .start_chat(ChatRequest::new("not a url", "hi"))
        .await
        .unwrap_err();
    let ctx = err.context().expect("configuration errors carry context");
    assert_eq!(ctx.field_path.as_deref(), Some("request.endpoint"));
}
