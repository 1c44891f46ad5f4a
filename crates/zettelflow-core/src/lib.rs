//! # zettelflow core
//!
//! The content-transformation layer of the zettelflow pipeline. Everything in
//! this crate is synchronous and free of network access; the stage drivers in
//! `zettelflow-pipeline` compose these pieces with a completion provider.
//!
//! ## Modules
//!
//! - [`frontmatter`]: the `---` delimited note format (decode / encode)
//! - [`chunker`]: literal-delimiter splitting of ingested text
//! - [`render`]: handlebars rendering of chunks into note files
//! - [`stage`]: stage directories, eligibility listing and retirement
//! - [`completion`]: the completion-service abstraction
//! - [`prompt`]: literal placeholder substitution for prompt files
//! - [`filter`]: `key==value` selection on note metadata

#![warn(clippy::all)]

pub mod chunker;
pub mod completion;
pub mod error;
pub mod filter;
pub mod frontmatter;
pub mod prompt;
pub mod render;
pub mod stage;

pub use chunker::{Chunk, Chunker, DEFAULT_DELIMITER};
pub use completion::{
    collect_stream, CompletionParams, CompletionProvider, LlmError, LlmResult,
};
pub use error::{PipelineError, PipelineResult};
pub use filter::MetadataFilter;
pub use frontmatter::{Decoded, Note, MARKER};
pub use prompt::{PromptTemplate, ENRICH_PLACEHOLDER, INGEST_PLACEHOLDER};
pub use render::{NoteData, NoteRenderer};
pub use stage::{CleanOutcome, RunClock, StageDir, StageFile, PROCESSED_DIR};
