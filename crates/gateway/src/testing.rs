//! Test doubles shared by the unit tests in this crate.

use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use dc_domain::config::Config;
use dc_domain::error::{Error, Result};
use dc_providers::{ChatRequest, ChatResponse, LlmProvider};

use crate::state::AppState;

/// Provider double that always gives the same answer (or the same error)
/// and records every request it receives.
pub struct ScriptedProvider {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn replying(content: &str) -> Arc<Self> {
        Self::with(Ok(content.into()))
    }

    pub fn failing(error: Error) -> Arc<Self> {
        Self::with(Err(error.to_string()))
    }

    fn with(reply: std::result::Result<String, String>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().push(req.clone());
        let content = self.reply.clone().map_err(Error::Other)?;
        Ok(ChatResponse {
            content,
            usage: None,
            model: "scripted".into(),
            finish_reason: Some("stop".into()),
        })
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted"
    }
}

/// State with default config whose knowledge file points into a temp dir.
/// The file itself is not created.
pub fn test_state(provider: Arc<dyn LlmProvider>) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.assistant.knowledge_path = dir.path().join("knowledge.txt");
    config.server.static_dir = dir.path().join("static");
    (AppState::new(Arc::new(config), provider), dir)
}
