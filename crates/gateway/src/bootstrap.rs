//! Startup wiring shared by `serve`, `run` and `chat`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use dc_domain::config::{Config, ConfigSeverity};
use dc_providers::auth::resolve_api_key;
use dc_providers::OpenAiCompatProvider;
use dc_sessions::IdlePolicy;

use crate::state::AppState;

/// Validate the config, resolve credentials and build the shared state.
///
/// A missing API key is not fatal: the server still starts and every chat
/// turn degrades to the apology reply until a key is provided.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }

    // ── LLM provider ─────────────────────────────────────────────────
    let api_key = match resolve_api_key(&config.llm.auth) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(error = %e, "no API key available, chat turns will fail");
            String::new()
        }
    };
    let provider = OpenAiCompatProvider::from_config(&config.llm, api_key)
        .context("building LLM provider")?;
    tracing::info!(
        provider = %config.llm.provider_id,
        model = %config.llm.model,
        base_url = %config.llm.base_url,
        "LLM provider ready"
    );

    // ── Knowledge document ───────────────────────────────────────────
    if !config.assistant.knowledge_path.exists() {
        tracing::warn!(
            path = %config.assistant.knowledge_path.display(),
            "knowledge file not found, new sessions start with empty knowledge"
        );
    }

    Ok(AppState::new(config, Arc::new(provider)))
}

/// Spawn long-running maintenance loops.  Must be called from within a
/// tokio runtime.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Idle session sweeper ─────────────────────────────────────────
    let Some(policy) = IdlePolicy::from_minutes(state.config.sessions.idle_ttl_minutes) else {
        tracing::debug!("idle session eviction disabled");
        return;
    };

    let sessions = state.sessions.clone();
    let period = Duration::from_secs(state.config.sessions.sweep_interval_secs.max(1));
    tracing::info!(
        idle_ttl_minutes = policy.max_idle().num_minutes(),
        sweep_interval_secs = period.as_secs(),
        "idle session sweeper started"
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let evicted = sessions.evict_idle(&policy, chrono::Utc::now());
            if evicted > 0 {
                tracing::debug!(evicted, remaining = sessions.len(), "idle sweep done");
            }
        }
    });
}
