//! Note rendering through a handlebars template
//!
//! The template sees four fields: `Content`, `Date`, `Title` and `Tags`, plus a
//! `join` helper taking the separator first (`{{join ", " Tags}}`). Rendering
//! is strict, so a template referencing anything else fails instead of
//! silently producing an empty string.

use crate::chunker::Chunk;
use crate::error::{PipelineError, PipelineResult};
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use std::path::Path;

const TEMPLATE_NAME: &str = "note";

/// Values exposed to the note template
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct NoteData {
    #[serde(rename = "Content")]
    pub content: String,
    /// `YYYY-MM-DD`
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
}

impl NoteData {
    /// Template data for a chunk. Title and tags start empty and are filled
    /// in by the enrich stage.
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            content: chunk.raw_text.clone(),
            date: chunk.creation_date.format("%Y-%m-%d").to_string(),
            title: String::new(),
            tags: Vec::new(),
        }
    }
}

handlebars_helper!(join: |sep: str, items: array| {
    items
        .iter()
        .map(|item| match item.as_str() {
            Some(s) => s.to_string(),
            None => item.to_string(),
        })
        .collect::<Vec<_>>()
        .join(sep)
});

/// Compiled note template
pub struct NoteRenderer {
    registry: Handlebars<'static>,
}

impl NoteRenderer {
    /// Compile a template from source text
    pub fn new(template: &str) -> PipelineResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("join", Box::new(join));
        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| PipelineError::format(format!("invalid note template: {e}")))?;
        Ok(Self { registry })
    }

    /// Compile the template stored at `path`
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Self::new(&source)
    }

    /// Render one chunk into note text
    pub fn render(&self, chunk: &Chunk) -> PipelineResult<String> {
        self.render_data(&NoteData::from_chunk(chunk))
    }

    pub fn render_data(&self, data: &NoteData) -> PipelineResult<String> {
        self.registry
            .render(TEMPLATE_NAME, data)
            .map_err(|e| PipelineError::format(format!("failed to render note: {e}")))
    }
}

impl std::fmt::Debug for NoteRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteRenderer").finish_non_exhaustive()
    }
}
