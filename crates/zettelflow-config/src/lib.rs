//! # zettelflow configuration
//!
//! Loads `config.toml` with precedence defaults < file < environment <
//! command-line overrides, resolves stage and asset directories, and scaffolds
//! a fresh configuration directory on first run.
//!
//! ```rust,no_run
//! use zettelflow_config::{ConfigOverrides, ZettelConfig};
//!
//! let config = ZettelConfig::load(None, &ConfigOverrides::default())?;
//! println!("ingest dir: {}", config.ingest_dir().display());
//! # Ok::<(), zettelflow_config::ConfigError>(())
//! ```

#![warn(clippy::all)]

mod config;
mod error;
mod scaffold;

pub use config::*;
pub use error::*;
pub use scaffold::*;
