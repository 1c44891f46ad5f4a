//! zettelflow CLI library
//!
//! Command-line surface of the zettelflow pipeline: argument parsing, logging
//! setup, terminal output and one module per subcommand.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;
