//! deskchat gateway: HTTP surface, turn runtime, and CLI for the
//! customer-support assistant.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
