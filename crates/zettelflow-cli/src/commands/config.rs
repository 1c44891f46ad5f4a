use anyhow::Result;
use colored::Colorize;

use crate::cli::{ConfigCommands, ConfigFormat};
use crate::output;
use zettelflow_config::{create_data_dirs, write_default_assets, ZettelConfig};

/// Execute config subcommand
pub fn execute(config: &ZettelConfig, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Path => {
            println!("{}", config.config_path().display());
            Ok(())
        }
        ConfigCommands::Show { format } => show(config, format),
        ConfigCommands::Init { force } => init(config, force),
    }
}

/// Show the current effective configuration
fn show(config: &ZettelConfig, format: ConfigFormat) -> Result<()> {
    let rendered = match format {
        ConfigFormat::Json => config.display_as_json()?,
        ConfigFormat::Toml => config.display_as_toml()?,
    };
    println!("{}", rendered);
    Ok(())
}

/// Write the default config file, prompts and template
fn init(config: &ZettelConfig, force: bool) -> Result<()> {
    let report = write_default_assets(config.config_dir(), force)?;
    let dirs = create_data_dirs(config)?;

    if report.files.is_empty() {
        println!(
            "{} Configuration already exists in: {}",
            "Error:".red().bold(),
            config.config_dir().display()
        );
        println!("Use {} to overwrite", "--force".yellow());
        return Ok(());
    }

    for file in &report.files {
        output::success(format!("Created {}", file.display()));
    }
    for dir in &dirs {
        output::success(format!("Created directory {}", dir.display()));
    }
    println!(
        "\n{}",
        "Edit config.toml to set your provider, models and directories.".dimmed()
    );
    Ok(())
}
