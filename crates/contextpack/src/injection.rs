/// Opening delimiter of the knowledge section.
pub const KNOWLEDGE_BEGIN: &str = "=== ZNALOSTNI BAZE ===";
/// Closing delimiter of the knowledge section.
pub const KNOWLEDGE_END: &str = "=== KONEC ZNALOSTNI BAZE ===";

/// Wrap the knowledge document between the section delimiters.
///
/// An empty document still yields both delimiters so the model sees an
/// explicitly empty section.
pub fn format_knowledge_section(content: &str) -> String {
    format!("{KNOWLEDGE_BEGIN}\n{content}\n{KNOWLEDGE_END}\n")
}
