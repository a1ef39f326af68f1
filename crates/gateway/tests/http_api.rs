//! HTTP-level tests for the deskchat router.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the
//! chat-completion backend is replaced by a scripted provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use dc_domain::config::Config;
use dc_domain::error::{Error, Result};
use dc_domain::message::{Message, Role};
use dc_gateway::api;
use dc_gateway::state::AppState;
use dc_providers::{ChatRequest, ChatResponse, LlmProvider, Usage};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Test doubles & helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Echoes the last user message back, or fails with a fixed error.
struct EchoProvider {
    fail_with: Option<String>,
    calls: Mutex<Vec<ChatRequest>>,
}

impl EchoProvider {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(reason.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait::async_trait]
impl LlmProvider for EchoProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        self.calls.lock().push(req.clone());
        if let Some(reason) = &self.fail_with {
            return Err(Error::Timeout(reason.clone()));
        }
        let last = req
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(ChatResponse {
            content: format!("echo: {last}"),
            usage: Some(Usage {
                prompt_tokens: 5,
                completion_tokens: 2,
                total_tokens: 7,
            }),
            model: "echo-1".into(),
            finish_reason: Some("stop".into()),
        })
    }

    fn provider_id(&self) -> &str {
        "echo"
    }

    fn default_model(&self) -> &str {
        "echo-1"
    }
}

struct Harness {
    app: Router,
    state: AppState,
    dir: TempDir,
}

fn harness(provider: Arc<EchoProvider>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.server.static_dir = dir.path().join("static");
    config.assistant.knowledge_path = dir.path().join("knowledge.txt");

    let state = AppState::new(Arc::new(config), provider);
    let app = api::router().with_state(state.clone());
    Harness { app, state, dir }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn post_chat(app: &Router, payload: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app, req).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Health
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn health_reports_ok_without_touching_sessions() {
    let provider = EchoProvider::ok();
    let h = harness(provider.clone());

    let (status, body) = send(&h.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(h.state.sessions.is_empty());
    assert_eq!(provider.calls(), 0);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn chat_returns_reply_and_records_turn() {
    let h = harness(EchoProvider::ok());
    std::fs::write(h.dir.path().join("knowledge.txt"), "Granule skladem.").unwrap();

    let (status, body) = post_chat(&h.app, json!({"message": "Mate granule?", "sessionId": "tab-1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reply": "echo: Mate granule?"}));

    let messages = h.state.sessions.snapshot("tab-1").unwrap();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].content.contains("Granule skladem."));
    assert_eq!(messages[1], Message::user("Mate granule?"));
    assert_eq!(messages[2], Message::assistant("echo: Mate granule?"));
}

#[tokio::test]
async fn missing_session_id_uses_default() {
    let h = harness(EchoProvider::ok());

    post_chat(&h.app, json!({"message": "ahoj"})).await;
    post_chat(&h.app, json!({"message": "jeste jednou", "session_id": "default"})).await;

    assert_eq!(h.state.sessions.len(), 1);
    assert_eq!(h.state.sessions.snapshot("default").unwrap().len(), 5);
}

#[tokio::test]
async fn session_keys_are_not_normalized() {
    let h = harness(EchoProvider::ok());

    post_chat(&h.app, json!({"message": "ahoj", "sessionId": " a"})).await;
    post_chat(&h.app, json!({"message": "ahoj", "sessionId": "a"})).await;
    post_chat(&h.app, json!({"message": "ahoj", "sessionId": "   "})).await;

    assert_eq!(h.state.sessions.len(), 3);
    assert!(h.state.sessions.contains(" a"));
    assert!(h.state.sessions.contains("a"));
    assert!(h.state.sessions.contains("default"));
}

#[tokio::test]
async fn upstream_failure_is_a_200_with_apology() {
    let h = harness(EchoProvider::failing("request timed out"));

    let (status, body) = post_chat(&h.app, json!({"message": "ahoj", "sessionId": "s1"})).await;
    assert_eq!(status, StatusCode::OK);

    let reply = body["reply"].as_str().unwrap();
    assert!(reply.starts_with("Omlouvam se, doslo k chybe: "));
    assert!(reply.contains("timed out"));

    let messages = h.state.sessions.snapshot("s1").unwrap();
    assert_eq!(messages.last().unwrap(), &Message::assistant(reply));
}

#[tokio::test]
async fn twenty_five_turns_end_at_window_size() {
    let h = harness(EchoProvider::ok());

    for i in 0..25 {
        let (status, _) =
            post_chat(&h.app, json!({"message": format!("dotaz {i}"), "sessionId": "s1"})).await;
        assert_eq!(status, StatusCode::OK);
    }

    let messages = h.state.sessions.snapshot("s1").unwrap();
    assert_eq!(messages.len(), 21);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[20], Message::assistant("echo: dotaz 24"));
}

#[tokio::test]
async fn malformed_body_is_rejected_without_side_effects() {
    let provider = EchoProvider::ok();
    let h = harness(provider.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&h.app, req).await;
    assert!(status.is_client_error());

    let (status, _) = post_chat(&h.app, json!({"sessionId": "s1"})).await;
    assert!(status.is_client_error());

    assert!(h.state.sessions.is_empty());
    assert_eq!(provider.calls(), 0);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Static assets
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn static_files_are_served_with_content_types() {
    let h = harness(EchoProvider::ok());
    let static_dir = h.dir.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<h1>Chat</h1>").unwrap();
    std::fs::write(static_dir.join("widget.js"), "console.log('widget');").unwrap();

    let resp = h.app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let resp = h.app.clone().oneshot(get("/widget.js")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));
    let body = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"console.log('widget');");
}

#[tokio::test]
async fn missing_static_files_are_404() {
    let h = harness(EchoProvider::ok());

    let (status, _) = send(&h.app, get("/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&h.app, get("/widget.js")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
