use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::output;
use zettelflow_config::ZettelConfig;
use zettelflow_core::MetadataFilter;
use zettelflow_llm::create_completion_provider;
use zettelflow_pipeline::EnrichDriver;

/// Execute the enrich command
pub async fn execute(mut config: ZettelConfig, filter: Option<String>) -> Result<()> {
    let filter = filter
        .as_deref()
        .map(MetadataFilter::parse)
        .transpose()?;

    super::ensure_api_key(&mut config)?;
    let provider =
        create_completion_provider(&config.llm).context("Failed to create completion provider")?;
    let driver = EnrichDriver::new(&config, provider.clone())?.with_filter(filter.clone());

    output::section("Enrich settings");
    output::setting("Provider", provider.provider_name());
    output::setting("Model", &driver.params().model);
    output::setting("Temperature", driver.params().temperature);
    output::setting("Max tokens", driver.params().max_tokens);
    output::setting("Workers", driver.parallel());
    if let Some(filter) = &filter {
        output::setting("Filter", filter);
    }
    println!();

    let files = driver.eligible()?;
    if files.is_empty() {
        output::info(format!(
            "No notes to enrich in {}",
            config.split_dir().display()
        ));
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let result = driver
        .run_with_progress(|file, _| {
            pb.set_message(file.file_name.clone());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();
    let report = result?;

    output::success(format!(
        "Enriched {} note(s) into {}",
        report.processed.len(),
        config.enrich_dir().display()
    ));
    if !report.skipped.is_empty() {
        output::info(format!(
            "{} note(s) did not match the filter",
            report.skipped.len()
        ));
    }
    super::finish(&report)
}
