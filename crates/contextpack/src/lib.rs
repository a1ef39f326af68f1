//! System prompt assembly: loads the knowledge document and renders it into
//! the assistant's instruction template.

pub mod injection;
pub mod knowledge;
pub mod prompt;

pub use knowledge::{load_knowledge, KnowledgeDocument};
pub use prompt::SystemPromptBuilder;
