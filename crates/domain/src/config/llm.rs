use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat-completion provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Upstream chat-completion settings.  Every turn uses the same model,
/// temperature and output bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Identifier used in logs and error messages.
    #[serde(default = "d_provider_id")]
    pub provider_id: String,
    /// Base URL of an OpenAI-compatible API (no trailing `/chat/completions`).
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_model")]
    pub model: String,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default = "d_max_tokens")]
    pub max_tokens: u32,
    /// Deadline for a single outbound call.  A call that exceeds it is
    /// treated like any other provider failure.
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub auth: ApiKeyConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_id: d_provider_id(),
            base_url: d_base_url(),
            model: d_model(),
            temperature: d_temperature(),
            max_tokens: d_max_tokens(),
            timeout_ms: d_timeout_ms(),
            auth: ApiKeyConfig::default(),
        }
    }
}

/// Where the provider API key comes from.
///
/// Precedence: process environment variable `env`, then a `KEY=value` line
/// for the same variable inside `dotenv_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    #[serde(default = "d_key_env")]
    pub env: String,
    #[serde(default = "d_dotenv_path")]
    pub dotenv_path: PathBuf,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            env: d_key_env(),
            dotenv_path: d_dotenv_path(),
        }
    }
}

fn d_provider_id() -> String {
    "openai".into()
}
fn d_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_model() -> String {
    "gpt-4o".into()
}
fn d_temperature() -> f32 {
    0.7
}
fn d_max_tokens() -> u32 {
    1024
}
fn d_timeout_ms() -> u64 {
    60_000
}
fn d_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn d_dotenv_path() -> PathBuf {
    PathBuf::from(".env")
}
