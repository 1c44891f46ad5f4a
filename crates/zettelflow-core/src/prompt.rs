//! Prompt files with a literal placeholder

use crate::error::{PipelineError, PipelineResult};
use std::path::Path;
use tracing::warn;

/// Placeholder replaced by the raw input in ingest prompts
pub const INGEST_PLACEHOLDER: &str = "{input_text}";

/// Placeholder replaced by the full note file in enrich prompts
pub const ENRICH_PLACEHOLDER: &str = "{content}";

/// A prompt template. Substitution is plain string replacement of every
/// occurrence of the placeholder; nothing else in the text is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
    placeholder: &'static str,
}

impl PromptTemplate {
    pub fn ingest(text: impl Into<String>) -> Self {
        Self::with_placeholder(text.into(), INGEST_PLACEHOLDER)
    }

    pub fn enrich(text: impl Into<String>) -> Self {
        Self::with_placeholder(text.into(), ENRICH_PLACEHOLDER)
    }

    /// Read a prompt file, using `placeholder` for substitution
    pub fn load(path: &Path, placeholder: &'static str) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let template = Self::with_placeholder(text, placeholder);
        if !template.has_placeholder() {
            warn!(
                "Prompt {} has no {} placeholder; input will not be included",
                path.display(),
                placeholder
            );
        }
        Ok(template)
    }

    fn with_placeholder(text: String, placeholder: &'static str) -> Self {
        Self { text, placeholder }
    }

    pub fn has_placeholder(&self) -> bool {
        self.text.contains(self.placeholder)
    }

    pub fn placeholder(&self) -> &str {
        self.placeholder
    }

    /// Substitute `value` for every placeholder occurrence
    pub fn fill(&self, value: &str) -> String {
        self.text.replace(self.placeholder, value)
    }
}
