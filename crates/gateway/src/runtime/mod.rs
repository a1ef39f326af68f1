//! Turn runtime: one user message in, one assistant reply out.
//!
//! The HTTP handler and the CLI commands both go through [`run_turn`], so a
//! conversation behaves the same regardless of where it is driven from.

pub mod session;

use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use dc_domain::message::Message;
use dc_domain::trace::TraceEvent;
use dc_providers::{ChatRequest, Usage};

use crate::state::AppState;

pub use session::ensure_session;

/// Prefix of the reply sent back when the upstream call fails.
pub const APOLOGY_PREFIX: &str = "Omlouvam se, doslo k chybe: ";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Input for a single turn.
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub session_id: String,
    pub message: String,
}

/// Result of a turn.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The model answered.
    Replied {
        content: String,
        usage: Option<Usage>,
    },
    /// The outbound call failed; `reason` is the rendered error.
    Failed { reason: String },
}

impl TurnOutcome {
    pub fn is_replied(&self) -> bool {
        matches!(self, Self::Replied { .. })
    }

    /// Text shown to the customer.  Failures become the apology sentence.
    pub fn reply_text(&self) -> String {
        match self {
            Self::Replied { content, .. } => content.clone(),
            Self::Failed { reason } => format!("{APOLOGY_PREFIX}{reason}"),
        }
    }

    pub fn usage(&self) -> Option<Usage> {
        match self {
            Self::Replied { usage, .. } => *usage,
            Self::Failed { .. } => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// run_turn
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one conversational turn.
///
/// 1. Ensure the session exists (builds the system prompt on first use).
/// 2. Append the user message and apply the window; snapshot the transcript.
/// 3. Call the provider with the configured temperature and token limit.
/// 4. Append the reply (or the apology, when `record_failures` is on) and
///    apply the window again.
///
/// Session locks are released before the provider call and re-acquired
/// afterwards.
pub async fn run_turn(state: &AppState, input: TurnInput) -> TurnOutcome {
    let turn_id = Uuid::new_v4();
    let span = tracing::info_span!("turn", %turn_id, session_id = %input.session_id);
    run_turn_inner(state, input).instrument(span).await
}

async fn run_turn_inner(state: &AppState, input: TurnInput) -> TurnOutcome {
    let max_history = state.sessions.max_history();
    let handle = ensure_session(state, &input.session_id).await;

    let transcript = {
        let mut session = handle.lock();
        session.push(Message::user(input.message));
        session.truncate(max_history);
        session.messages().to_vec()
    };

    let llm_cfg = &state.config.llm;
    let req = ChatRequest {
        messages: transcript,
        temperature: Some(llm_cfg.temperature),
        max_tokens: Some(llm_cfg.max_tokens),
        model: None,
    };

    let started = Instant::now();
    let result = state.llm.chat(&req).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let outcome = match result {
        Ok(resp) => {
            TraceEvent::LlmRequest {
                provider: state.llm.provider_id().to_string(),
                model: resp.model.clone(),
                messages: req.messages.len(),
                duration_ms,
                prompt_tokens: resp.usage.map(|u| u.prompt_tokens),
                completion_tokens: resp.usage.map(|u| u.completion_tokens),
                ok: true,
            }
            .emit();
            TurnOutcome::Replied {
                content: resp.content,
                usage: resp.usage,
            }
        }
        Err(e) => {
            TraceEvent::LlmRequest {
                provider: state.llm.provider_id().to_string(),
                model: state.llm.default_model().to_string(),
                messages: req.messages.len(),
                duration_ms,
                prompt_tokens: None,
                completion_tokens: None,
                ok: false,
            }
            .emit();
            tracing::warn!(error = %e, "chat completion failed");
            TurnOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    if outcome.is_replied() || state.config.assistant.record_failures {
        let mut session = handle.lock();
        session.push(Message::assistant(outcome.reply_text()));
        session.truncate(max_history);
    }

    outcome
}
