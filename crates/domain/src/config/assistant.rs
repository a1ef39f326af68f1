use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assistant persona & knowledge
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Business the assistant speaks for; interpolated into the system prompt.
    #[serde(default = "d_business_name")]
    pub business_name: String,

    /// Plain-text knowledge document injected into every new session.
    /// A missing file yields an empty knowledge section.
    #[serde(default = "d_knowledge_path")]
    pub knowledge_path: PathBuf,

    /// Store the apology text as the assistant turn when the upstream call
    /// fails.  When `false` the failed user message is still kept but no
    /// assistant entry is written.
    #[serde(default = "d_true")]
    pub record_failures: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            business_name: d_business_name(),
            knowledge_path: d_knowledge_path(),
            record_failures: true,
        }
    }
}

fn d_business_name() -> String {
    "Shop4Dog.cz".into()
}
fn d_knowledge_path() -> PathBuf {
    PathBuf::from("knowledge.txt")
}
fn d_true() -> bool {
    true
}
