use serde::Serialize;

/// Structured trace events emitted across all deskchat crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    KnowledgeLoaded {
        path: String,
        chars: usize,
        missing: bool,
    },
    SessionCreated {
        session_id: String,
        prompt_chars: usize,
    },
    SessionTruncated {
        session_id: String,
        dropped: usize,
        kept: usize,
    },
    SessionsEvicted {
        evicted: usize,
        remaining: usize,
    },
    LlmRequest {
        provider: String,
        model: String,
        messages: usize,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
        ok: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "dc_event");
    }
}
