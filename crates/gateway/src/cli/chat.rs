//! `deskchat chat` — interactive REPL.
//!
//! Reads lines with rustyline, sends each one through the turn runtime and
//! prints the reply.  Slash-commands switch or reset the session.

use std::sync::Arc;

use dc_domain::config::Config;

use crate::bootstrap;
use crate::runtime::{run_turn, TurnInput};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the interactive chat REPL until `/exit` or Ctrl+D.
pub async fn chat(config: Arc<Config>, session: Option<String>) -> anyhow::Result<()> {
    let mut session_id =
        session.unwrap_or_else(|| config.sessions.default_session_id.clone());

    let state = bootstrap::build_app_state(config)?;
    // The REPL can stay open for a long time.
    bootstrap::spawn_background_tasks(&state);

    let mut rl = rustyline::DefaultEditor::new()?;

    // Banner goes to stderr, keep stdout for replies.
    eprintln!("deskchat interactive chat ({})", state.config.assistant.business_name);
    eprintln!("Session: {session_id}  |  Type /help for commands, Ctrl+D to exit");
    eprintln!();

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed).ok();

                if trimmed.starts_with('/') {
                    if handle_slash_command(trimmed, &state, &mut session_id) {
                        break;
                    }
                    continue;
                }

                let outcome = run_turn(
                    &state,
                    TurnInput {
                        session_id: session_id.clone(),
                        message: trimmed.to_string(),
                    },
                )
                .await;
                if outcome.is_replied() {
                    println!("bot> {}", outcome.reply_text());
                } else {
                    println!("\x1B[31mbot> {}\x1B[0m", outcome.reply_text());
                }
                println!();
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    eprintln!("Na shledanou!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process a slash command.  Returns `true` if the REPL should exit.
fn handle_slash_command(input: &str, state: &AppState, session_id: &mut String) -> bool {
    let (cmd, arg) = match input.split_once(' ') {
        Some((cmd, arg)) => (cmd, Some(arg.trim()).filter(|s| !s.is_empty())),
        None => (input, None),
    };

    match cmd {
        "/exit" | "/quit" => return true,

        "/session" => match arg {
            Some(name) => {
                *session_id = name.to_string();
                eprintln!("Session switched to: {session_id}");
            }
            None => {
                eprintln!("Current session: {session_id}");
                eprintln!("Usage: /session <id>");
            }
        },

        "/reset" => {
            if state.sessions.remove(session_id) {
                eprintln!("Session {session_id} reset");
            } else {
                eprintln!("Session {session_id} has no history yet");
            }
        }

        "/help" => {
            eprintln!("/session <id>  switch to another conversation");
            eprintln!("/reset         forget the current conversation");
            eprintln!("/help          show this help");
            eprintln!("/exit          quit");
        }

        other => eprintln!("Unknown command: {other} (try /help)"),
    }

    false
}
