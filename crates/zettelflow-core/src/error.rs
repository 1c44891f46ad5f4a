//! Pipeline error types

use crate::completion::LlmError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while running a pipeline stage.
///
/// The variants follow the scope of the failure: `Configuration`, `Format` and
/// `Stage` stop the whole invocation, while `Io` and `Transport` belong to a
/// single file and are subject to the halt-on-error policy.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or invalid setting, detected before any I/O
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Reading or writing a single file failed
    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The completion service failed for a single input
    #[error("Completion failed for {}: {}", .path.display(), .source)]
    Transport {
        /// Input whose completion failed
        path: PathBuf,
        /// Underlying provider error
        #[source]
        source: LlmError,
    },

    /// Template parse or render failure
    #[error("Template error: {0}")]
    Format(String),

    /// A stage directory could not be listed or created
    #[error("Stage directory {} unavailable: {}", .path.display(), .source)]
    Stage {
        /// Directory that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Specialized Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Wrap an I/O error for a file
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a completion failure for an input
    pub fn transport(path: impl AsRef<Path>, source: LlmError) -> Self {
        Self::Transport {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a directory-level failure
    pub fn stage(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Stage {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether the error only concerns one file of a multi-file run
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Transport { .. })
    }

    /// The file this error is attributed to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } | Self::Transport { path, .. } | Self::Stage { path, .. } => {
                Some(path)
            }
            Self::Configuration(_) | Self::Format(_) => None,
        }
    }
}
