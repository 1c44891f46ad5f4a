use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use crate::output;
use zettelflow_config::ZettelConfig;
use zettelflow_core::{PromptTemplate, INGEST_PLACEHOLDER};
use zettelflow_llm::create_completion_provider;
use zettelflow_pipeline::{IngestDriver, InputSource};

/// Execute the ingest command
pub async fn execute(
    mut config: ZettelConfig,
    path: Option<PathBuf>,
    prompt: Option<PathBuf>,
) -> Result<()> {
    super::ensure_api_key(&mut config)?;
    let provider =
        create_completion_provider(&config.llm).context("Failed to create completion provider")?;

    let driver = match prompt {
        Some(prompt_path) => {
            config.validate_ingest()?;
            let prompt = PromptTemplate::load(&prompt_path, INGEST_PLACEHOLDER)?;
            IngestDriver::with_prompt(&config, provider.clone(), prompt)
        }
        None => IngestDriver::new(&config, provider.clone())?,
    };

    output::section("Ingest settings");
    output::setting("Provider", provider.provider_name());
    output::setting("Model", &driver.params().model);
    output::setting("Temperature", driver.params().temperature);
    output::setting("Max tokens", driver.params().max_tokens);
    println!();

    let source = InputSource::resolve(path, io::stdin().is_terminal());
    match &source {
        InputSource::Path(path) if path.is_dir() => {
            output::info(format!("Ingesting all files in directory: {}", path.display()))
        }
        InputSource::Path(path) => output::info(format!("Ingesting file: {}", path.display())),
        InputSource::Piped => output::info("Ingesting from stdin..."),
        InputSource::Interactive => {
            output::info("Enter text to ingest. Press Enter for a new line.");
            output::info("When you are finished, press Ctrl+D on a new, empty line.");
        }
    }

    let report = driver
        .run(&source, io::stdin().lock(), |fragment| {
            print!("{}", fragment.bright_cyan());
            let _ = io::stdout().flush();
        })
        .await?;
    println!();

    if source.is_interactive() && report.processed.is_empty() && !report.skipped.is_empty() {
        output::warning("No input provided. Exiting.");
        return Ok(());
    }

    for skipped in &report.skipped {
        output::warning(format!("Skipped empty input {}", skipped.display()));
    }
    for saved in &report.outputs {
        output::success(format!("Saved ingested text to: {}", saved.display()));
    }
    super::finish(&report)?;

    output::success("Ingest stage complete.");
    Ok(())
}
