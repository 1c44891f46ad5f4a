pub mod clean;
pub mod config;
pub mod enrich;
pub mod ingest;
pub mod list;
pub mod split;

use crate::output;
use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Password};
use std::io::{self, IsTerminal};
use zettelflow_config::{first_run_init, persist_api_key, ZettelConfig};
use zettelflow_pipeline::RunReport;

/// Scaffold the configuration directory and data directories on first use
pub fn ensure_initialized(config: &ZettelConfig) -> Result<()> {
    let Some(report) = first_run_init(config).context("First-run setup failed")? else {
        return Ok(());
    };

    output::info(format!(
        "First run: created default configuration in {}",
        config.config_dir().display()
    ));
    for path in report.files.iter().chain(report.dirs.iter()) {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Make sure a provider that needs an API key has one.
///
/// On a terminal the key is asked for and saved to the config file.
pub fn ensure_api_key(config: &mut ZettelConfig) -> Result<()> {
    if !config.llm.provider.requires_api_key() || config.llm.api_key().is_some() {
        return Ok(());
    }

    if !io::stdin().is_terminal() {
        bail!(
            "No API key configured for the {} provider. Set llm.api_key in {} or the ZETTELFLOW_API_KEY environment variable",
            config.llm.provider,
            config.config_path().display()
        );
    }

    output::warning(format!(
        "No API key configured for the {} provider.",
        config.llm.provider
    ));
    let key: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API key")
        .interact()
        .context("Failed to read API key")?;
    let key = key.trim().to_string();
    if key.is_empty() {
        bail!("An API key is required for the {} provider", config.llm.provider);
    }

    persist_api_key(config.config_path(), &key)?;
    output::success(format!(
        "API key saved to {}",
        config.config_path().display()
    ));
    config.llm.api_key = Some(key);
    Ok(())
}

/// Report per-file failures of a run that was allowed to continue
pub fn finish(report: &RunReport) -> Result<()> {
    if report.is_success() {
        return Ok(());
    }
    for failure in &report.failures {
        output::error(&failure.error);
    }
    bail!("{} file(s) failed", report.failures.len())
}
