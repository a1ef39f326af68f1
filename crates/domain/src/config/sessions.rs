use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// In-memory session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Session key used when a request carries no `sessionId`.
    #[serde(default = "d_default_session_id")]
    pub default_session_id: String,

    /// Number of non-system messages kept per session.  The system prompt is
    /// always kept on top, so a session holds at most `max_history + 1`
    /// messages.
    #[serde(default = "d_max_history")]
    pub max_history: usize,

    /// Drop sessions that have been idle for this many minutes.  `None`
    /// keeps every session for the lifetime of the process.
    #[serde(default)]
    pub idle_ttl_minutes: Option<u32>,

    /// How often the idle sweeper runs.
    #[serde(default = "d_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            default_session_id: d_default_session_id(),
            max_history: d_max_history(),
            idle_ttl_minutes: None,
            sweep_interval_secs: d_sweep_interval_secs(),
        }
    }
}

fn d_default_session_id() -> String {
    "default".into()
}
fn d_max_history() -> usize {
    20
}
fn d_sweep_interval_secs() -> u64 {
    60
}
