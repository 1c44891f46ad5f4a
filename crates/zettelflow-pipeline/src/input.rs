//! Where ingest text comes from

use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use zettelflow_core::{PipelineError, PipelineResult, StageDir};

/// Label used for text read from standard input
pub const STDIN_LABEL: &str = "<stdin>";

/// Input for one ingest invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A file, or every direct file of a directory
    Path(PathBuf),
    /// Standard input redirected from a pipe or file
    Piped,
    /// Standard input attached to a terminal, read until EOF
    Interactive,
}

impl InputSource {
    /// Pick the source: an explicit path wins, otherwise stdin decides.
    pub fn resolve(path: Option<PathBuf>, stdin_is_terminal: bool) -> Self {
        match path {
            Some(path) => InputSource::Path(path),
            None if stdin_is_terminal => InputSource::Interactive,
            None => InputSource::Piped,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, InputSource::Interactive)
    }

    pub fn is_stdin(&self) -> bool {
        !matches!(self, InputSource::Path(_))
    }

    /// Files to ingest for a path source, in name order.
    ///
    /// Stdin sources have no files. A missing path is an error naming it.
    pub fn files(&self) -> PipelineResult<Vec<PathBuf>> {
        let InputSource::Path(path) = self else {
            return Ok(Vec::new());
        };

        let metadata = fs::metadata(path).map_err(|e| PipelineError::stage(path, e))?;
        if metadata.is_dir() {
            let files = StageDir::new(path).list_eligible(None)?;
            Ok(files.into_iter().map(|f| f.path).collect())
        } else {
            Ok(vec![path.clone()])
        }
    }
}

/// One piece of text to send through the ingest prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputUnit {
    /// File the text came from, or [`STDIN_LABEL`]
    pub origin: PathBuf,
    pub text: String,
}

impl InputUnit {
    pub fn read_file(path: &Path) -> PipelineResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Ok(Self {
            origin: path.to_path_buf(),
            text,
        })
    }

    /// Read lines until EOF. Every line, the last included, ends in `\n`.
    pub fn read_stdin<R: BufRead>(reader: R) -> PipelineResult<Self> {
        let mut text = String::new();
        for line in reader.lines() {
            let line = line.map_err(|e| PipelineError::io(STDIN_LABEL, e))?;
            text.push_str(&line);
            text.push('\n');
        }
        Ok(Self {
            origin: PathBuf::from(STDIN_LABEL),
            text,
        })
    }

    /// Whitespace-only input is never sent to the model
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
