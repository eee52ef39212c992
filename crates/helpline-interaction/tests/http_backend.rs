use helpline_core::backend::{ChatBackend, ChatRequest, LoginRequest};
use helpline_core::error::HelplineError;
use helpline_core::message::MessageId;
use helpline_interaction::HttpChatBackend;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn order_request() -> ChatRequest {
    ChatRequest {
        message: "Where is my order o1?".to_string(),
        customer_email: "user@example.com".to_string(),
        session_id: "session-1".to_string(),
    }
}

#[tokio::test]
async fn test_health_success_and_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(server.uri());
    assert!(backend.health().await.is_ok());

    let failing = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&failing)
        .await;

    let backend = HttpChatBackend::new(failing.uri());
    assert!(matches!(backend.health().await, Err(HelplineError::Backend(_))));
}

#[tokio::test]
async fn test_health_unreachable_host() {
    // Nothing listens on the discard port.
    let backend = HttpChatBackend::new("http://127.0.0.1:9")
        .with_timeout(Some(Duration::from_secs(2)));
    assert!(backend.health().await.is_err());
}

#[tokio::test]
async fn test_send_chat_posts_payload_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("Authorization", "Bearer jwt-123"))
        .and(body_json(json!({
            "message": "Where is my order o1?",
            "customer_email": "user@example.com",
            "session_id": "session-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Your order o1 shipped 2 days ago.",
            "session_id": "session-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(server.uri());
    let reply = backend
        .send_chat(&order_request(), Some("jwt-123"))
        .await
        .expect("chat should succeed");

    assert_eq!(reply.answer(), Some("Your order o1 shipped 2 days ago."));
}

#[tokio::test]
async fn test_send_chat_without_token_omits_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "hi"})))
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(server.uri());
    backend.send_chat(&order_request(), None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_send_chat_server_error_and_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("{\"detail\": \"boom\"}"))
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(server.uri());
    let err = backend.send_chat(&order_request(), None).await.unwrap_err();
    assert!(err.is_backend());
    assert!(err.to_string().contains("500"));

    let garbled = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&garbled)
        .await;

    let backend = HttpChatBackend::new(garbled.uri());
    let err = backend.send_chat(&order_request(), None).await.unwrap_err();
    assert!(err.to_string().contains("malformed"));
}

#[tokio::test]
async fn test_fetch_history_decodes_entries_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat/history"))
        .and(query_param("session_id", "session-1"))
        .and(query_param("email", "user@example.com"))
        .and(header("Authorization", "Bearer jwt-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "role": "system", "content": "You are a support agent."},
            {"id": "m1", "role": "user", "content": "Where is my order o1?"},
            {"id": "m2", "role": "assistant", "content": "Your order o1 shipped 2 days ago."},
            {"id": 4, "role": "assistant", "content": null}
        ])))
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(server.uri());
    let entries = backend
        .fetch_history("session-1", "user@example.com", Some("jwt-123"))
        .await
        .unwrap();

    let ids: Vec<_> = entries.iter().map(|e| e.id.clone()).collect();
    assert_eq!(
        ids,
        vec![
            MessageId::new("1"),
            MessageId::new("m1"),
            MessageId::new("m2"),
            MessageId::new("4")
        ]
    );
    assert_eq!(entries[2].role, "assistant");
    assert!(entries[3].content.is_none());
}

#[tokio::test]
async fn test_login_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"email": "user@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-abc",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(server.uri());
    let token = backend
        .login(&LoginRequest {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(token, "jwt-abc");
}

#[tokio::test]
async fn test_login_rejected_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})))
        .mount(&server)
        .await;

    let backend = HttpChatBackend::new(server.uri());
    let err = backend
        .login(&LoginRequest {
            email: "user@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_auth());
}
