//! Configuration errors

use std::path::PathBuf;

/// Errors from loading, validating or writing configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read config file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected shape
    #[error("Failed to parse config file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration could not be rendered as TOML or JSON
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// A required setting is empty
    #[error("{0} is not defined in the configuration")]
    MissingSetting(String),

    /// The home or config directory could not be determined
    #[error("Could not determine the home directory")]
    HomeDir,

    /// Writing scaffolding or persisting a setting failed
    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn missing(setting: impl Into<String>) -> Self {
        Self::MissingSetting(setting.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
