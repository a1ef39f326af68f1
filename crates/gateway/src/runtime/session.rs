use dc_contextpack::load_knowledge;
use dc_sessions::SessionHandle;

use crate::state::AppState;

/// Return the session for `session_id`, creating it with a freshly rendered
/// system prompt if it does not exist yet.
///
/// The knowledge file is read outside any store lock.  If two requests race
/// to create the same session, the store keeps whichever prompt lands first
/// and the other rendering is discarded.
pub async fn ensure_session(state: &AppState, session_id: &str) -> SessionHandle {
    if let Some(handle) = state.sessions.get(session_id) {
        return handle;
    }

    let knowledge = load_knowledge(&state.config.assistant.knowledge_path).await;
    let prompt = state.prompt.render(knowledge.text());
    let (handle, _is_new) = state.sessions.get_or_create(session_id, move || prompt);
    handle
}
