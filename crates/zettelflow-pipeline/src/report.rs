//! Run reports and the per-file error policy

use std::path::{Path, PathBuf};
use tracing::warn;
use zettelflow_config::ConfigError;
use zettelflow_core::{PipelineError, PipelineResult};

/// What a stage does when a single file fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop the stage at the first failed file
    Halt,
    /// Record the failure and move on to the next file
    Continue,
}

impl ErrorPolicy {
    pub fn from_halt_on_error(halt_on_error: bool) -> Self {
        if halt_on_error {
            ErrorPolicy::Halt
        } else {
            ErrorPolicy::Continue
        }
    }
}

/// A file that could not be processed
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: PipelineError,
}

/// Outcome of one stage invocation
#[derive(Debug, Default)]
pub struct RunReport {
    /// Inputs handled successfully, in processing order
    pub processed: Vec<PathBuf>,
    /// Files written by the stage
    pub outputs: Vec<PathBuf>,
    /// Inputs deliberately left alone (empty text, filtered out)
    pub skipped: Vec<PathBuf>,
    /// Inputs that failed under [`ErrorPolicy::Continue`]
    pub failures: Vec<FileFailure>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Nothing was processed, skipped or failed
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty() && self.skipped.is_empty() && self.failures.is_empty()
    }

    pub(crate) fn record_success(&mut self, source: &Path, outputs: Vec<PathBuf>) {
        self.processed.push(source.to_path_buf());
        self.outputs.extend(outputs);
    }

    pub(crate) fn record_skip(&mut self, source: &Path) {
        self.skipped.push(source.to_path_buf());
    }

    /// Apply `policy` to a failure on `source`.
    ///
    /// Errors that are not scoped to one file always end the run.
    pub(crate) fn record_failure(
        &mut self,
        source: &Path,
        error: PipelineError,
        policy: ErrorPolicy,
    ) -> PipelineResult<()> {
        if !error.is_per_file() || policy == ErrorPolicy::Halt {
            return Err(error);
        }

        warn!("Skipping {}: {}", source.display(), error);
        self.failures.push(FileFailure {
            path: source.to_path_buf(),
            error,
        });
        Ok(())
    }
}

/// Configuration problems surface as pipeline configuration errors
pub(crate) fn config_error(error: ConfigError) -> PipelineError {
    PipelineError::configuration(error.to_string())
}
