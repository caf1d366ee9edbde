//! Streaming chat endpoint integration tests
//!
//! Covers conversation resolve-or-create, token relay, post-stream
//! persistence, request validation, and provider failure behavior.

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
};
use futures::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::{eventually, TestApp, UserFixture};
use threadline_llm::mock::MockLlmService;

fn chat_request(user: &UserFixture, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header(AUTHORIZATION, user.bearer())
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn parse_body(response: axum::http::Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::http::Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_str<'r>(response: &'r axum::http::Response<Body>, name: &str) -> Option<&'r str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

mod test_new_conversation {
    use super::*;

    #[tokio::test]
    async fn test_streams_tokens_and_persists_turn() {
        let app = TestApp::new();
        let user = app.login("Ada");

        let resp = app
            .router()
            .oneshot(chat_request(
                &user,
                json!({"messages": [{"role": "user", "content": "tell me a joke"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            header_str(&resp, "content-type"),
            Some("text/plain; charset=utf-8")
        );

        let conversation_id: Uuid = header_str(&resp, "x-conversation-id")
            .expect("conversation id header")
            .parse()
            .unwrap();
        assert_eq!(
            header_str(&resp, "x-conversation-title"),
            Some(r#"Mock response to: {"role":"user","content":"tell me a joke"}"#)
        );

        assert_eq!(body_text(resp).await, "Mock response to: tell me a joke");

        eventually(|| app.store.message_count() == 2, "turn persisted").await;

        let resp = app
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri(format!("/api/chat/{conversation_id}/messages"))
                    .header(AUTHORIZATION, user.bearer())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = parse_body(resp).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["role"], "user");
        assert_eq!(data[0]["content"], "tell me a joke");
        assert_eq!(data[1]["role"], "assistant");
        assert_eq!(data[1]["content"], "Mock response to: tell me a joke");
    }

    #[tokio::test]
    async fn test_conversation_created_with_generated_title() {
        let app = TestApp::new();
        let user = app.login("Ada");

        let resp = app
            .router()
            .oneshot(chat_request(
                &user,
                json!({"messages": [{"role": "user", "content": "tell me a joke"}]}),
            ))
            .await
            .unwrap();
        let conversation_id = header_str(&resp, "x-conversation-id")
            .expect("conversation id header")
            .to_string();
        body_text(resp).await;

        // One title completion, carrying the serialized first user message
        let completions = app.llm.recorded_completions();
        assert_eq!(completions.len(), 1);
        assert_eq!(
            completions[0].messages[0].content,
            r#"{"role":"user","content":"tell me a joke"}"#
        );
        assert!(completions[0]
            .system_prompt
            .as_deref()
            .unwrap_or_default()
            .contains("short title"));

        let resp = app
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri(format!("/api/chat/{conversation_id}"))
                    .header(AUTHORIZATION, user.bearer())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = parse_body(resp).await;
        assert_eq!(
            body["data"]["title"],
            r#"Mock response to: {"role":"user","content":"tell me a joke"}"#
        );
    }
}

mod test_existing_conversation {
    use super::*;

    #[tokio::test]
    async fn test_appends_turn_without_regenerating_title() {
        let app = TestApp::new();
        let user = app.login("Ada");
        let conversation = app.seed_conversation(user.user.id, "Jokes").await;
        app.seed_turn(conversation.id, "Hi", "Mock response to: Hi")
            .await;

        let resp = app
            .router()
            .oneshot(chat_request(
                &user,
                json!({
                    "conversationId": conversation.id,
                    "messages": [
                        {"role": "user", "content": "Hi"},
                        {"role": "assistant", "content": "Mock response to: Hi"},
                        {"role": "user", "content": "what about Rust?"}
                    ]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            header_str(&resp, "x-conversation-id"),
            Some(conversation.id.to_string().as_str())
        );
        // Title is only generated for new conversations
        assert!(header_str(&resp, "x-conversation-title").is_none());

        assert_eq!(body_text(resp).await, "Mock response to: what about Rust?");

        eventually(|| app.store.message_count() == 4, "second turn persisted").await;

        assert!(app.llm.recorded_completions().is_empty());
        let streams = app.llm.recorded_streams();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_conversation_id_returns_404() {
        let app = TestApp::new();
        let user = app.login("Ada");

        let resp = app
            .router()
            .oneshot(chat_request(
                &user,
                json!({
                    "conversationId": Uuid::new_v4(),
                    "messages": [{"role": "user", "content": "Hi"}]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = parse_body(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Conversation not found!");

        assert!(app.llm.recorded_streams().is_empty());
        assert_eq!(app.store.message_count(), 0);
    }

    #[tokio::test]
    async fn test_not_owned_conversation_returns_404() {
        let app = TestApp::new();
        let ada = app.login("Ada");
        let ben = app.login("Ben");
        let conversation = app.seed_conversation(ada.user.id, "Private").await;

        let resp = app
            .router()
            .oneshot(chat_request(
                &ben,
                json!({
                    "conversationId": conversation.id,
                    "messages": [{"role": "user", "content": "Hi"}]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.store.message_count(), 0);
    }
}

mod test_chat_validation {
    use super::*;

    #[tokio::test]
    async fn test_empty_messages_rejected() {
        let app = TestApp::new();
        let user = app.login("Ada");

        let resp = app
            .router()
            .oneshot(chat_request(&user, json!({"messages": []})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = parse_body(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Messages are required!");
        assert_eq!(app.store.conversation_count(), 0);
    }

    #[tokio::test]
    async fn test_history_without_user_message_rejected() {
        let app = TestApp::new();
        let user = app.login("Ada");

        let resp = app
            .router()
            .oneshot(chat_request(
                &user,
                json!({"messages": [{"role": "assistant", "content": "Hello"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = parse_body(resp).await;
        assert_eq!(body["error"], "User message not found!");
        assert_eq!(app.store.conversation_count(), 0);
        assert!(app.llm.recorded_completions().is_empty());
    }

    #[tokio::test]
    async fn test_missing_messages_field_rejected() {
        let app = TestApp::new();
        let user = app.login("Ada");

        let resp = app
            .router()
            .oneshot(chat_request(&user, json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = parse_body(resp).await;
        assert_eq!(body["success"], false);
    }
}

mod test_provider_failures {
    use super::*;

    #[tokio::test]
    async fn test_title_failure_aborts_creation() {
        let app = TestApp::with_llm(MockLlmService::failing_completion());
        let user = app.login("Ada");

        let resp = app
            .router()
            .oneshot(chat_request(
                &user,
                json!({"messages": [{"role": "user", "content": "Hi"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = parse_body(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal Server Error!");

        assert_eq!(app.store.conversation_count(), 0);
        assert!(app.llm.recorded_streams().is_empty());
    }

    #[tokio::test]
    async fn test_stream_refusal_keeps_empty_conversation() {
        let app = TestApp::with_llm(MockLlmService::failing_stream());
        let user = app.login("Ada");

        let resp = app
            .router()
            .oneshot(chat_request(
                &user,
                json!({"messages": [{"role": "user", "content": "Hi"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = parse_body(resp).await;
        assert_eq!(body["error"], "Internal Server Error!");

        // The conversation was created before the stream was opened, and
        // stays behind with no messages
        assert_eq!(app.store.conversation_count(), 1);
        assert_eq!(app.store.message_count(), 0);
    }

    #[tokio::test]
    async fn test_midstream_failure_truncates_and_persists_nothing() {
        let app = TestApp::with_llm(MockLlmService::failing_stream_after(2));
        let user = app.login("Ada");

        let resp = app
            .router()
            .oneshot(chat_request(
                &user,
                json!({"messages": [{"role": "user", "content": "tell me a joke"}]}),
            ))
            .await
            .unwrap();
        // Headers were already sent when the stream broke
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(header_str(&resp, "x-conversation-id").is_some());

        let mut frames = resp.into_body().into_data_stream();
        let mut text = String::new();
        let mut saw_error = false;
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(bytes) => text.push_str(std::str::from_utf8(&bytes).unwrap()),
                Err(_) => {
                    saw_error = true;
                    break;
                }
            }
        }
        assert_eq!(text, "Mock response ");
        assert!(saw_error, "body should end in a stream error");

        // Nothing is persisted for an interrupted turn
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(app.store.conversation_count(), 1);
        assert_eq!(app.store.message_count(), 0);
    }
}
