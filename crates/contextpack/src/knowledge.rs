//! Knowledge document loading.
//!
//! The document is read fresh every time a session is created; there is no
//! cache, so edits to the file apply to the next new conversation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dc_domain::trace::TraceEvent;

/// The knowledge document as read from disk.
#[derive(Debug, Clone)]
pub struct KnowledgeDocument {
    pub path: PathBuf,
    /// `None` when the file does not exist or could not be read.
    pub content: Option<String>,
}

impl KnowledgeDocument {
    /// Text to inject into the prompt (empty when the file is missing).
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn is_missing(&self) -> bool {
        self.content.is_none()
    }
}

/// Read the knowledge document at `path`.
///
/// Never fails: a missing file yields an empty document, other read errors
/// are logged and treated the same way.  Line endings are normalized to `\n`.
pub async fn load_knowledge(path: &Path) -> KnowledgeDocument {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(raw) => Some(raw.replace("\r\n", "\n")),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "knowledge document not found");
            None
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read knowledge document, using empty knowledge"
            );
            None
        }
    };

    let doc = KnowledgeDocument {
        path: path.to_path_buf(),
        content,
    };

    TraceEvent::KnowledgeLoaded {
        path: path.display().to_string(),
        chars: doc.text().len(),
        missing: doc.is_missing(),
    }
    .emit();

    doc
}
