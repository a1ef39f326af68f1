//! In-memory conversation state for deskchat.
//!
//! Each session key maps to a transcript that always starts with the system
//! prompt and is capped to a fixed window of recent turns.  Sessions live in
//! process memory only; an optional idle policy lets a background sweeper
//! drop conversations nobody has touched in a while.

pub mod lifecycle;
pub mod store;

pub use lifecycle::IdlePolicy;
pub use store::{Session, SessionHandle, SessionStore};
