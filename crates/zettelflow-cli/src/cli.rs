use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use zettelflow_config::{ConfigOverrides, StageName};

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "zettelflow")]
#[command(about = "zettelflow - turn raw prose into metadata-tagged notes with an LLM")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, defaults to 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/zettelflow/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep processing the remaining files after a file fails
    #[arg(long, global = true)]
    pub keep_going: bool,
}

impl Cli {
    /// Effective log level: explicit level, then --verbose, then warn
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::WARN,
        }
    }

    /// Settings given on the command line, applied over file and environment
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            halt_on_error: self.keep_going.then_some(false),
            ..ConfigOverrides::default()
        };

        match &self.command {
            Commands::Ingest { model, .. } => overrides.ingest_model = model.clone(),
            Commands::Split { delimiter, .. } => overrides.delimiter = delimiter.clone(),
            Commands::Enrich {
                model, parallel, ..
            } => {
                overrides.enrich_model = model.clone();
                overrides.parallel = *parallel;
            }
            Commands::List { .. } | Commands::Clean { .. } | Commands::Config(_) => {}
        }
        overrides
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a file, a directory or stdin and process it with the LLM
    ///
    /// Without PATH, piped stdin is read; on a terminal you are prompted for
    /// text until Ctrl+D.
    Ingest {
        /// File or directory to ingest
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Path to a custom prompt file
        #[arg(short = 'p', long)]
        prompt: Option<PathBuf>,

        /// Model to use (overrides ingest.model)
        #[arg(long)]
        model: Option<String>,
    },

    /// Split ingested files into individual notes
    Split {
        /// Delimiter to split on (overrides split.delimiter)
        #[arg(short = 'd', long)]
        delimiter: Option<String>,

        /// Show the notes that would be created without writing anything
        #[arg(long)]
        preview: bool,
    },

    /// Add LLM-generated metadata to split notes
    Enrich {
        /// Number of notes to enrich concurrently (overrides enrich.parallel)
        #[arg(short = 'j', long)]
        parallel: Option<usize>,

        /// Only enrich notes whose metadata matches key==value
        #[arg(long, value_name = "KEY==VALUE")]
        filter: Option<String>,

        /// Model to use (overrides enrich.model)
        #[arg(long)]
        model: Option<String>,
    },

    /// List the files waiting in a stage directory
    List {
        #[arg(value_enum, default_value = "all")]
        stage: StageArg,
    },

    /// Delete the files of a stage directory (sub-directories are kept)
    Clean {
        #[arg(value_enum)]
        stage: StageArg,

        /// Only show what would be deleted
        #[arg(short = 'd', long)]
        dry_run: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Stage selector for list and clean
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StageArg {
    Ingest,
    Split,
    Enrich,
    All,
}

impl StageArg {
    pub fn stages(self) -> Vec<StageName> {
        match self {
            StageArg::Ingest => vec![StageName::Ingest],
            StageArg::Split => vec![StageName::Split],
            StageArg::Enrich => vec![StageName::Enrich],
            StageArg::All => StageName::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the path of the config file in use
    Path,

    /// Show the current effective configuration (API key redacted)
    Show {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },

    /// Write the default config file, prompts and template
    Init {
        /// Overwrite existing files
        #[arg(short = 'F', long)]
        force: bool,
    },
}
