use serde::{Deserialize, Serialize};

use crate::llm_client::guard::word_count;

/// Where a document's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    PdfUpload,
    PastedText,
}

/// Unstructured resume or JD text as supplied by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentText {
    pub content: String,
    pub source: DocumentSource,
    /// Whitespace word count, the same proxy the prompt guard uses.
    pub word_count: usize,
}

impl DocumentText {
    pub fn new(content: String, source: DocumentSource) -> Self {
        let word_count = word_count(&content);
        Self {
            content,
            source,
            word_count,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}
