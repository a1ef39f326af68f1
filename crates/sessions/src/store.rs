//! Session store.
//!
//! Maps session keys to transcripts.  The map itself sits behind an
//! `RwLock` that is only held long enough to look up or insert a handle;
//! every transcript has its own `Mutex`, so turns on different sessions never
//! contend and turns on the same session are serialized per mutation.
//! Neither lock may be held across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use dc_domain::error::{Error, Result};
use dc_domain::message::{Message, Role};
use dc_domain::trace::TraceEvent;

use crate::lifecycle::IdlePolicy;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One conversation transcript.  `messages[0]` is always the system prompt.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Shared, lockable reference to a session owned by the store.
pub type SessionHandle = Arc<Mutex<Session>>;

impl Session {
    fn new(id: &str, system_prompt: String) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_owned(),
            messages: vec![Message::system(system_prompt)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system_prompt(&self) -> &Message {
        &self.messages[0]
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Append a message and mark the session active.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Keep the system prompt plus the newest `max_history` messages.
    ///
    /// Fires only when the transcript is longer than `max_history + 1`.
    /// Older turns are discarded, not summarized.  Returns the number of
    /// dropped messages (0 when nothing changed).
    pub fn truncate(&mut self, max_history: usize) -> usize {
        let cap = max_history + 1;
        if self.messages.len() <= cap {
            return 0;
        }

        let dropped = self.messages.len() - cap;
        self.messages.drain(1..=dropped);

        TraceEvent::SessionTruncated {
            session_id: self.id.clone(),
            dropped,
            kept: self.messages.len(),
        }
        .emit();

        dropped
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-lifetime store of all conversations.
pub struct SessionStore {
    max_history: usize,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    /// Create an empty store keeping `max_history` non-system messages per
    /// session.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Look up a session by its key.
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.read().get(session_id).cloned()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// Return the session for `session_id`, creating it on first use.
    ///
    /// `system_prompt` is only invoked when the session is created, so a
    /// repeated call never adds a second system message.  Returns
    /// `(handle, is_new)`.
    pub fn get_or_create(
        &self,
        session_id: &str,
        system_prompt: impl FnOnce() -> String,
    ) -> (SessionHandle, bool) {
        // Fast path: session already exists.
        if let Some(handle) = self.get(session_id) {
            return (handle, false);
        }

        // Slow path: re-check under the write lock, another request may have
        // created it in between.
        let mut sessions = self.sessions.write();
        if let Some(handle) = sessions.get(session_id) {
            return (handle.clone(), false);
        }

        let prompt = system_prompt();
        let prompt_chars = prompt.len();
        let handle = Arc::new(Mutex::new(Session::new(session_id, prompt)));
        sessions.insert(session_id.to_owned(), handle.clone());
        drop(sessions);

        TraceEvent::SessionCreated {
            session_id: session_id.to_owned(),
            prompt_chars,
        }
        .emit();

        (handle, true)
    }

    /// Append a message to an existing session.  Returns the new length.
    pub fn append(&self, session_id: &str, role: Role, content: impl Into<String>) -> Result<usize> {
        let handle = self.require(session_id)?;
        let mut session = handle.lock();
        session.push(Message::new(role, content));
        Ok(session.len())
    }

    /// Apply the truncation window to an existing session.  Returns whether
    /// any messages were dropped.
    pub fn truncate(&self, session_id: &str) -> Result<bool> {
        let handle = self.require(session_id)?;
        let dropped = handle.lock().truncate(self.max_history);
        Ok(dropped > 0)
    }

    /// Clone of the session's current transcript.
    pub fn snapshot(&self, session_id: &str) -> Option<Vec<Message>> {
        self.get(session_id).map(|h| h.lock().messages().to_vec())
    }

    /// Forget a session.  The next request with the same key starts over
    /// with a freshly built system prompt.
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().remove(session_id).is_some()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop sessions that `policy` considers idle at `now`.
    ///
    /// Sessions that are in use are skipped: either their lock is held, or a
    /// handle is still alive outside the store (a turn waiting on the model
    /// keeps one across the outbound call).  Returns the number of evicted
    /// sessions.
    pub fn evict_idle(&self, policy: &IdlePolicy, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();

        sessions.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Some(session) => !policy.is_expired(session.updated_at(), now),
                None => true,
            }
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            TraceEvent::SessionsEvicted {
                evicted,
                remaining: sessions.len(),
            }
            .emit();
        }
        evicted
    }

    fn require(&self, session_id: &str) -> Result<SessionHandle> {
        self.get(session_id)
            .ok_or_else(|| Error::SessionNotFound(session_id.to_owned()))
    }
}
