//! `deskchat run` — one-shot turn from the command line.
//!
//! Goes through the same runtime as the HTTP handler, so the reply (or the
//! apology on failure) is exactly what the widget would show.

use std::sync::Arc;

use dc_domain::config::Config;

use crate::bootstrap;
use crate::runtime::{run_turn, TurnInput, TurnOutcome};

/// Execute a single turn and print the reply to stdout.
///
/// Exits with code 1 when the upstream call failed.
pub async fn run(
    config: Arc<Config>,
    message: String,
    session: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let session_id = session.unwrap_or_else(|| config.sessions.default_session_id.clone());
    let state = bootstrap::build_app_state(config)?;

    let outcome = run_turn(
        &state,
        TurnInput {
            session_id: session_id.clone(),
            message,
        },
    )
    .await;

    if json_output {
        let json = serde_json::to_string_pretty(&outcome_json(&session_id, &outcome))
            .map_err(|e| anyhow::anyhow!("serializing reply: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", outcome.reply_text());
    }

    if let TurnOutcome::Failed { reason } = &outcome {
        tracing::warn!(reason = %reason, "turn failed");
        std::process::exit(1);
    }

    Ok(())
}

fn outcome_json(session_id: &str, outcome: &TurnOutcome) -> serde_json::Value {
    let usage = outcome.usage().map(|u| {
        serde_json::json!({
            "prompt_tokens": u.prompt_tokens,
            "completion_tokens": u.completion_tokens,
            "total_tokens": u.total_tokens,
        })
    });
    let error = match outcome {
        TurnOutcome::Failed { reason } => Some(reason.as_str()),
        TurnOutcome::Replied { .. } => None,
    };
    serde_json::json!({
        "session_id": session_id,
        "reply": outcome.reply_text(),
        "ok": outcome.is_replied(),
        "error": error,
        "usage": usage,
    })
}
