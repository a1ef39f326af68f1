use std::sync::Arc;

use dc_contextpack::SystemPromptBuilder;
use dc_domain::config::Config;
use dc_providers::LlmProvider;
use dc_sessions::SessionStore;

/// Shared application state passed to all API handlers and CLI commands.
///
/// Built once at startup; every field is behind an `Arc`, so cloning the
/// state per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub llm: Arc<dyn LlmProvider>,
    pub prompt: Arc<SystemPromptBuilder>,
}

impl AppState {
    /// Wire up the store and prompt builder from `config` around an
    /// already constructed provider.
    pub fn new(config: Arc<Config>, llm: Arc<dyn LlmProvider>) -> Self {
        let sessions = Arc::new(SessionStore::new(config.sessions.max_history));
        let prompt = Arc::new(SystemPromptBuilder::new(
            config.assistant.business_name.clone(),
        ));
        Self {
            config,
            sessions,
            llm,
            prompt,
        }
    }
}
