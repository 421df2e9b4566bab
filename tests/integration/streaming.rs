//! Integration tests for the chat call and reply classification

use crate::mock_server::{MockServerFixture, CHAT_PATH};
use chat_transport::{CancelHandle, ChatBody, ChatRequest, CredentialStore, StreamMode};
use futures::StreamExt;
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_request_headers_and_body() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", CHAT_PATH)
            .match_header("content-type", "application/json")
            .match_header("accept", "text/event-stream, text/plain, application/json")
            .match_header("authorization", "Bearer secret-token")
            .match_body(Matcher::Json(json!({
                "message": "Any good racing games?",
                "userId": "user-1",
                "gameId": 7
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"reply":"Try Forza."}"#)
            .create_async()
            .await
    };

    let client = fixture.client(None, None);
    let request = ChatRequest::new(format!("{}{}", fixture.base_url, CHAT_PATH), "Any good racing games?")
        .user_id("user-1")
        .token("secret-token")
        .extra_field("gameId", json!(7));
    let result = client.start_chat(request).await.unwrap();

    assert_eq!(result.json_text(), Some("Try Forza."));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_authorization_without_token() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", CHAT_PATH)
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::PartialJson(json!({"userId": null})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"hello"}"#)
            .create_async()
            .await
    };

    let client = fixture.client(None, None);
    let result = client.send_message("hi", None).await.unwrap();
    assert_eq!(result.json_text(), Some("hello"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_sse_streaming_response() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_sse_stream(vec!["event: message\ndata: Hello", "data:  World", ": keep-alive", "[DONE]", "ignored"])
        .await;

    let client = fixture.client(Some("tok"), Some("user-1"));
    let result = client.send_message("hi", None).await.unwrap();
    assert!(result.is_stream());
    assert_eq!(result.json_text(), None);
    assert_eq!(result.meta.content_type, "text/event-stream");

    let mut chunks = result.into_stream().unwrap();
    assert_eq!(chunks.mode(), StreamMode::Sse);
    let mut out = Vec::new();
    while let Some(chunk) = chunks.next_chunk().await.unwrap() {
        out.push(chunk);
    }
    assert_eq!(out, vec!["Hello", " World"]);
    assert!(chunks.is_finished());
}

#[tokio::test]
async fn test_plain_text_streaming_response() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_chat(200, "text/plain; charset=utf-8", "Just some plain text")
        .await;

    let client = fixture.client(None, None);
    let result = client.send_message("hi", None).await.unwrap();
    let chunks = result.into_stream().unwrap();
    assert_eq!(chunks.mode(), StreamMode::PlainText);

    let text: Vec<String> = chunks
        .into_stream()
        .map(|c| c.unwrap())
        .collect()
        .await;
    assert_eq!(text.concat(), "Just some plain text");
}

#[tokio::test]
async fn test_json_reply_is_never_streamed() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_chat(200, "application/json", r#"{"other":"value"}"#)
        .await;

    let client = fixture.client(None, None);
    let result = client.send_message("hi", None).await.unwrap();
    assert!(!result.is_stream());
    assert_eq!(result.json_text(), Some(r#"{"other":"value"}"#));
}

#[tokio::test]
async fn test_invalid_json_falls_back_to_raw_text() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_chat(200, "application/json", "definitely { not json")
        .await;

    let client = fixture.client(None, None);
    let text = client
        .send_message("hi", None)
        .await
        .unwrap()
        .into_text()
        .await
        .unwrap();
    assert_eq!(text, "definitely { not json");
}

#[tokio::test]
async fn test_response_headers_fill_meta_and_store_user_id() {
    let fixture = MockServerFixture::new().await;
    let _mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", CHAT_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-user-id", "assigned-user")
            .with_header("x-chat-session-id", "session-9")
            .with_body(r#"{"reply":"hi"}"#)
            .create_async()
            .await
    };

    let client = fixture.client(None, None);
    let result = client.send_message("hi", None).await.unwrap();
    assert_eq!(result.meta.new_user_id.as_deref(), Some("assigned-user"));
    assert_eq!(result.meta.new_session_id.as_deref(), Some("session-9"));
    assert_eq!(
        client.credentials().user_id().as_deref(),
        Some("assigned-user")
    );
}

#[tokio::test]
async fn test_cancel_before_dispatch_sends_nothing() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", CHAT_PATH)
            .expect(0)
            .create_async()
            .await
    };

    let cancel = CancelHandle::new();
    cancel.cancel();
    let client = fixture.client(None, None);
    let err = client.send_message("hi", Some(cancel)).await.unwrap_err();
    assert!(err.is_cancelled());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_after_first_chunk() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_sse_stream(vec!["first", "second", "third"])
        .await;

    let cancel = CancelHandle::new();
    let client = fixture.client(None, None);
    let result = client.send_message("hi", Some(cancel.clone())).await.unwrap();
    let mut chunks = match result.body {
        ChatBody::Stream(chunks) => chunks,
        ChatBody::Json(text) => panic!("expected a stream, got {text}"),
    };

    assert_eq!(chunks.next_chunk().await.unwrap().as_deref(), Some("first"));
    cancel.cancel();
    // Frames already received with the first read are still handed out;
    // the next network read observes the cancellation.
    let mut tail = Vec::new();
    let err = loop {
        match chunks.next_chunk().await {
            Ok(Some(chunk)) => tail.push(chunk),
            Ok(None) => panic!("stream ended instead of being cancelled"),
            Err(e) => break e,
        }
    };
    assert!(err.is_cancelled());
    assert!(tail.len() <= 2);
    assert!(chunks.is_finished());
}
