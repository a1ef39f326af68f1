mod assistant;
mod llm;
mod observability;
mod server;
mod sessions;

pub use assistant::*;
pub use llm::*;
pub use observability::*;
pub use server::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Apply process-environment overrides on top of the parsed file.
    ///
    /// `PORT` replaces `server.port` (hosting platforms inject it).  An
    /// unparsable value is ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        self.apply_port_override(std::env::var("PORT").ok().as_deref());
    }

    fn apply_port_override(&mut self, raw: Option<&str>) {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return;
        };
        match raw.parse::<u16>() {
            Ok(port) => self.server.port = port,
            Err(_) => tracing::warn!(value = %raw, "ignoring invalid PORT"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: &str, message: &str) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: &str) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut issues = Vec::new();

        if self.server.port == 0 {
            issues.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            issues.push(ConfigError::error("server.host", "host must not be empty"));
        }

        if self.llm.base_url.trim().is_empty() {
            issues.push(ConfigError::error("llm.base_url", "base_url must not be empty"));
        }
        if self.llm.model.trim().is_empty() {
            issues.push(ConfigError::error("llm.model", "model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            issues.push(ConfigError::error(
                "llm.temperature",
                "temperature must be between 0.0 and 2.0",
            ));
        }
        if self.llm.max_tokens == 0 {
            issues.push(ConfigError::error("llm.max_tokens", "max_tokens must be greater than 0"));
        }
        if self.llm.timeout_ms == 0 {
            issues.push(ConfigError::error("llm.timeout_ms", "timeout_ms must be greater than 0"));
        }

        if self.sessions.max_history == 0 {
            issues.push(ConfigError::error(
                "sessions.max_history",
                "max_history must keep at least one message",
            ));
        }
        if self.sessions.idle_ttl_minutes == Some(0) {
            issues.push(ConfigError::warning(
                "sessions.idle_ttl_minutes",
                "0 evicts every idle session on each sweep",
            ));
        }
        if self.sessions.idle_ttl_minutes.is_some() && self.sessions.sweep_interval_secs == 0 {
            issues.push(ConfigError::error(
                "sessions.sweep_interval_secs",
                "sweep interval must be at least 1 second when idle eviction is on",
            ));
        }

        if self.server.cors.allowed_origins.iter().any(|o| o == "*") {
            issues.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins",
            ));
        }

        issues
    }
}
