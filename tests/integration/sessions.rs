//! Integration tests for the session and message routes

use crate::mock_server::MockServerFixture;
use chat_transport::{ChatClient, ClientConfig, Error, Sender, StaticCredentials};
use mockito::Matcher;
use reqwest::StatusCode;
use std::sync::Arc;

const SESSION: &str = r#"{
    "_id": "sess-1",
    "user_id": "user 1",
    "session_started": "2024-05-01T10:00:00Z",
    "session_ended": null
}"#;

fn messages_body() -> String {
    r#"{
        "sessionId": "sess-1",
        "messages": [
            {"_id": "m1", "chat_session_id": "sess-1", "sender": "user", "message": "hi"},
            {"_id": "m2", "chat_session_id": "sess-1", "sender": "chatbot", "message": "hello", "createdAt": "2024-05-01T10:00:01Z"}
        ]
    }"#
    .to_string()
}

#[tokio::test]
async fn test_get_session_encodes_user_id() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", Matcher::Regex(r"^/session/user(%20| )1$".into()))
            .match_header("authorization", "Bearer tok")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"session": {SESSION}}}"#))
            .create_async()
            .await
    };

    let client = fixture.client(Some("tok"), None);
    let session = client.sessions().get_session("user 1").await.unwrap();
    assert_eq!(session.id, "sess-1");
    assert_eq!(session.user_id, "user 1");
    assert!(!session.is_ended());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_session_messages_uses_default_limit() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/session/user-1/messages")
            .match_query(Matcher::UrlEncoded("limit".into(), "100".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(messages_body())
            .create_async()
            .await
    };

    let client = fixture.client(None, None);
    let messages = client
        .sessions()
        .get_session_messages("user-1", None)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].sender, Sender::Chatbot);
    assert_eq!(messages[1].created_at.as_deref(), Some("2024-05-01T10:00:01Z"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_sessions_passes_page_and_limit() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/sessions/user-1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("limit".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"total": 11, "page": 2, "pageSize": 10, "pages": 2,
                    "sessions": [{"_id": "sess-1", "user_id": "user 1",
                    "session_started": "2024-05-01T10:00:00Z", "messageCount": 3}]}"#,
            )
            .create_async()
            .await
    };

    let client = fixture.client(None, None);
    let page = client
        .sessions()
        .list_sessions_by_user_id("user-1", Some(2), Some(10))
        .await
        .unwrap();
    assert_eq!(page.total, 11);
    assert_eq!(page.page_size, 10);
    assert_eq!(page.sessions[0].message_count, Some(3));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_messages_by_session_id() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/session/sess-1/messages/by-id")
            .match_query(Matcher::UrlEncoded("limit".into(), "5".into()))
            .with_status(200)
            .with_body(messages_body())
            .create_async()
            .await
    };

    let client = fixture.client(None, None);
    let messages = client
        .sessions()
        .get_messages_by_session_id("sess-1", Some(5))
        .await
        .unwrap();
    assert_eq!(messages[0].message, "hi");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_end_session_posts_json() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/session/sess-1/end")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(
                r#"{"session": {"_id": "sess-1", "user_id": "user 1",
                    "session_started": "2024-05-01T10:00:00Z",
                    "session_ended": "2024-05-01T11:00:00Z"}}"#,
            )
            .create_async()
            .await
    };

    let client = fixture.client(None, None);
    let session = client.sessions().end_session_by_id("sess-1").await.unwrap();
    assert!(session.is_ended());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_session() {
    let fixture = MockServerFixture::new().await;
    let _deleted = fixture
        .mock_json_route("DELETE", "/session/sess-1", 200, r#"{"deleted": true}"#)
        .await;
    let _missing_flag = fixture
        .mock_json_route("DELETE", "/session/sess-2", 200, r#"{}"#)
        .await;

    let client = fixture.client(None, None);
    assert!(client.sessions().delete_session_by_id("sess-1").await.unwrap());
    assert!(!client.sessions().delete_session_by_id("sess-2").await.unwrap());
}

#[tokio::test]
async fn test_session_route_error_is_a_transport_error() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_route("GET", "/session/nobody", 404, r#"{"error":"not found"}"#)
        .await;

    let client = fixture.client(None, None);
    let err = client.sessions().get_session("nobody").await.unwrap_err();
    match err {
        Error::Transport(transport) => {
            assert_eq!(transport.status, StatusCode::NOT_FOUND);
            assert!(transport.body.contains("not found"));
        }
        other => panic!("expected a transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_shape_is_a_decode_error() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_route("GET", "/session/user-1", 200, r#"{"nope": true}"#)
        .await;

    let client = fixture.client(None, None);
    let err = client.sessions().get_session("user-1").await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_session_routes_follow_a_separate_base() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_route(
            "GET",
            "/api/chat/session/user-1",
            200,
            &format!(r#"{{"session": {SESSION}}}"#),
        )
        .await;

    let client = ChatClient::builder()
        .config(ClientConfig::default())
        .base_url(&fixture.base_url)
        .session_base_url(format!("{}/api/chat", fixture.base_url))
        .credentials(Arc::new(StaticCredentials::default()))
        .build()
        .unwrap();
    assert_eq!(
        client.config().chat_endpoint().unwrap().path(),
        "/api/chat"
    );

    let session = client.sessions().get_session("user-1").await.unwrap();
    assert_eq!(session.id, "sess-1");
    mock.assert_async().await;
}
