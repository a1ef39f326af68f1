//! `POST /api/chat` — one conversational turn.
//!
//! Upstream failures are answered with HTTP 200 and the apology text as the
//! reply, so the widget never has to special-case errors.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::runtime::{run_turn, TurnInput};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / response shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User message text.
    pub message: String,
    /// Client-chosen conversation key, used exactly as sent.  Absent or
    /// whitespace-only means the shared default session.
    #[serde(default, rename = "sessionId", alias = "session_id")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let session_id = resolve_session_id(&state, body.session_id);

    let input = TurnInput {
        session_id,
        message: body.message,
    };
    let outcome = run_turn(&state, input).await;

    Json(ChatResponse {
        reply: outcome.reply_text(),
    })
}

fn resolve_session_id(state: &AppState, requested: Option<String>) -> String {
    requested
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.config.sessions.default_session_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state, ScriptedProvider};

    #[test]
    fn request_accepts_both_key_spellings() {
        let camel: ChatRequest =
            serde_json::from_str(r#"{"message": "ahoj", "sessionId": "abc"}"#).unwrap();
        assert_eq!(camel.session_id.as_deref(), Some("abc"));

        let snake: ChatRequest =
            serde_json::from_str(r#"{"message": "ahoj", "session_id": "xyz"}"#).unwrap();
        assert_eq!(snake.session_id.as_deref(), Some("xyz"));

        let none: ChatRequest = serde_json::from_str(r#"{"message": "ahoj"}"#).unwrap();
        assert!(none.session_id.is_none());
    }

    #[test]
    fn missing_message_is_rejected() {
        assert!(serde_json::from_str::<ChatRequest>(r#"{"sessionId": "abc"}"#).is_err());
    }

    #[test]
    fn blank_session_falls_back_to_default() {
        let (state, _dir) = test_state(ScriptedProvider::replying("ok"));
        assert_eq!(resolve_session_id(&state, None), "default");
        assert_eq!(resolve_session_id(&state, Some("".into())), "default");
        assert_eq!(resolve_session_id(&state, Some(" \t ".into())), "default");
        assert_eq!(resolve_session_id(&state, Some("tab-42".into())), "tab-42");
    }

    #[test]
    fn session_key_is_kept_verbatim() {
        let (state, _dir) = test_state(ScriptedProvider::replying("ok"));
        assert_eq!(resolve_session_id(&state, Some(" a".into())), " a");
        assert_eq!(resolve_session_id(&state, Some("a ".into())), "a ");
        assert_ne!(
            resolve_session_id(&state, Some(" a".into())),
            resolve_session_id(&state, Some("a".into()))
        );
    }
}
