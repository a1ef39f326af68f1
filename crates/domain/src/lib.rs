//! Shared types for the deskchat crates: conversation messages, the error
//! type, configuration and structured trace events.

pub mod config;
pub mod error;
pub mod message;
pub mod trace;
