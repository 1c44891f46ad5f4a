use anyhow::Result;
use clap::Parser;
use tracing::debug;

use zettelflow_cli::{
    cli::{Cli, Commands},
    commands, logging,
};
use zettelflow_config::ZettelConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration with CLI overrides
    let config = ZettelConfig::load(cli.config.clone(), &cli.overrides())?;

    let log_file = logging::init_logging(cli.level_filter(), Some(&config.logs_dir()))?;
    debug!(
        "Using config {} (log file: {:?})",
        config.config_path().display(),
        log_file
    );

    // Config utilities work on an uninitialized directory
    if !matches!(cli.command, Commands::Config(_)) {
        commands::ensure_initialized(&config)?;
    }

    match cli.command {
        Commands::Ingest { path, prompt, .. } => {
            commands::ingest::execute(config, path, prompt).await?
        }
        Commands::Split { preview, .. } => commands::split::execute(&config, preview)?,
        Commands::Enrich { filter, .. } => commands::enrich::execute(config, filter).await?,
        Commands::List { stage } => commands::list::execute(&config, stage)?,
        Commands::Clean { stage, dry_run } => commands::clean::execute(&config, stage, dry_run)?,
        Commands::Config(cmd) => commands::config::execute(&config, cmd)?,
    }

    Ok(())
}
