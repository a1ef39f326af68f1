//! Idle-session lifecycle.
//!
//! Sessions are never reset mid-conversation; they are only dropped by the
//! sweeper once they have been idle for longer than the configured TTL.  The
//! next request with the same key then starts a fresh conversation.

use chrono::{DateTime, Duration, Utc};

/// Decides whether a session has been idle long enough to be evicted.
#[derive(Debug, Clone, Copy)]
pub struct IdlePolicy {
    max_idle: Duration,
}

impl IdlePolicy {
    pub fn new(max_idle: Duration) -> Self {
        Self { max_idle }
    }

    /// Build a policy from `sessions.idle_ttl_minutes`.  `None` disables
    /// eviction.
    pub fn from_minutes(minutes: Option<u32>) -> Option<Self> {
        minutes.map(|m| Self::new(Duration::minutes(i64::from(m))))
    }

    pub fn max_idle(&self) -> Duration {
        self.max_idle
    }

    /// `true` when the last activity is at least `max_idle` before `now`.
    pub fn is_expired(&self, last_active: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last_active) >= self.max_idle
    }
}
