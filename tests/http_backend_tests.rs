//! Integration tests for the HTTP chat backend
//!
//! Runs the backend and a full session against a local mock endpoint.

use mockito::Matcher;
use serde_json::json;
use std::time::Duration;
use zksurfer::backend::{ChatBackend, HttpBackend};
use zksurfer::config::Config;
use zksurfer::content::UserInput;
use zksurfer::types::ChatMessage;
use zksurfer::{ChatError, ChatSession};

mod transport_tests {
    use super::*;

    #[tokio::test]
    async fn posts_messages_and_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .with_status(200)
            .with_body(r#"{"content":"hello"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api/chat", server.url()), None);
        let body = backend.send(&[ChatMessage::user("hi")]).await.unwrap();

        assert_eq!(body, r#"{"content":"hello"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn sends_bearer_token_when_configured() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body(r#"{"content":"ok"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(
            format!("{}/api/chat", server.url()),
            Some("secret".to_string()),
        );
        backend.send(&[ChatMessage::user("x")]).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api/chat", server.url()), None);
        let err = backend.send(&[ChatMessage::user("x")]).await.unwrap_err();

        match err {
            ChatError::Status { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9/api/chat", None);
        let err = backend.send(&[ChatMessage::user("x")]).await.unwrap_err();
        assert!(matches!(err, ChatError::Transport(_)));
    }
}

mod session_over_http {
    use super::*;

    #[tokio::test]
    async fn image_turn_round_trip() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(
                json!({
                    "content": "/img/result.png",
                    "type": "img",
                    "prompt": "a red car",
                    "proof": {"hash": "0xfeed"}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let config = Config::default()
            .with_endpoint(format!("{}/api/chat", server.url()))
            .with_timeout(Duration::from_secs(10));
        let session = ChatSession::from_config(&config);

        assert!(session.submit(UserInput::text("a red car")).await.is_resolved());
        assert_eq!(
            session.display_log()[1].content.as_text(),
            Some("/img/result.png")
        );
        assert_eq!(session.api_log()[1].content.as_text(), Some("a red car"));
        assert_eq!(session.latest_proof(), Some(json!({"hash": "0xfeed"})));
    }

    #[tokio::test]
    async fn server_error_leaves_only_user_turn() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(503)
            .create_async()
            .await;

        let config = Config::default().with_endpoint(format!("{}/api/chat", server.url()));
        let session = ChatSession::from_config(&config);

        let outcome = session.submit(UserInput::text("anyone?")).await;

        assert!(outcome.error().is_some_and(ChatError::is_transport));
        assert_eq!(session.display_log().len(), 1);
        assert!(!session.is_loading());
    }
}
