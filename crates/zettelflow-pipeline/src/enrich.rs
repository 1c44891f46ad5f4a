//! Enrich stage: replace each note's metadata with the model's, keeping the body

use crate::report::{config_error, ErrorPolicy, RunReport};
use futures::stream::{self, StreamExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use zettelflow_config::ZettelConfig;
use zettelflow_core::frontmatter::extract_model_metadata;
use zettelflow_core::{
    CompletionParams, CompletionProvider, MetadataFilter, Note, PipelineError, PipelineResult,
    PromptTemplate, StageDir, StageFile, ENRICH_PLACEHOLDER,
};

/// Result of enriching one note
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// The enriched note was written to this path
    Written(PathBuf),
    /// The note's existing metadata did not match the filter
    Filtered,
}

/// Asks the model for metadata for every split note and writes the
/// re-encoded note into the enrich directory under the same name.
pub struct EnrichDriver {
    provider: Arc<dyn CompletionProvider>,
    prompt: PromptTemplate,
    params: CompletionParams,
    source: StageDir,
    output: StageDir,
    extension: String,
    parallel: usize,
    filter: Option<MetadataFilter>,
    policy: ErrorPolicy,
}

impl EnrichDriver {
    /// Create a driver using the configured enrich prompt file
    pub fn new(config: &ZettelConfig, provider: Arc<dyn CompletionProvider>) -> PipelineResult<Self> {
        config.validate_enrich().map_err(config_error)?;
        let prompt = PromptTemplate::load(&config.enrich_prompt_path(), ENRICH_PLACEHOLDER)?;
        Ok(Self::with_prompt(config, provider, prompt))
    }

    /// Create a driver with an already loaded prompt
    pub fn with_prompt(
        config: &ZettelConfig,
        provider: Arc<dyn CompletionProvider>,
        prompt: PromptTemplate,
    ) -> Self {
        let settings = &config.enrich;
        Self {
            provider,
            prompt,
            params: CompletionParams::new(
                settings.model.clone(),
                settings.temperature,
                settings.max_completion_tokens,
            ),
            source: StageDir::new(config.split_dir()),
            output: StageDir::new(config.enrich_dir()),
            extension: config.split.output_extension.clone(),
            parallel: settings.parallel.max(1),
            filter: None,
            policy: ErrorPolicy::from_halt_on_error(config.pipeline.halt_on_error),
        }
    }

    /// Only enrich notes whose current metadata matches `filter`
    pub fn with_filter(mut self, filter: Option<MetadataFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn params(&self) -> &CompletionParams {
        &self.params
    }

    pub fn parallel(&self) -> usize {
        self.parallel
    }

    /// Split notes the next run would look at
    pub fn eligible(&self) -> PipelineResult<Vec<StageFile>> {
        self.source.list_eligible(Some(&self.extension))
    }

    pub async fn run(&self) -> PipelineResult<RunReport> {
        self.run_with_progress(|_, _| {}).await
    }

    /// Enrich every eligible note, calling `on_file` as each result is
    /// consumed.
    ///
    /// Up to `parallel` completions are in flight at once; results are
    /// consumed in listing order whatever order they finish in.
    pub async fn run_with_progress<F>(&self, mut on_file: F) -> PipelineResult<RunReport>
    where
        F: FnMut(&StageFile, &PipelineResult<EnrichOutcome>),
    {
        let files = self.eligible()?;
        self.output.ensure_exists()?;
        info!(
            "Enriching {} note(s) from {} with {} worker(s)",
            files.len(),
            self.source.path().display(),
            self.parallel
        );

        let mut results = stream::iter(files.iter())
            .map(|file| async move { (file, self.enrich_file(file).await) })
            .buffered(self.parallel);

        let mut report = RunReport::new();
        while let Some((file, result)) = results.next().await {
            on_file(file, &result);
            match result {
                Ok(EnrichOutcome::Written(output)) => {
                    report.record_success(&file.path, vec![output])
                }
                Ok(EnrichOutcome::Filtered) => report.record_skip(&file.path),
                Err(e) => report.record_failure(&file.path, e, self.policy)?,
            }
        }
        Ok(report)
    }

    /// Enrich a single split note
    pub async fn enrich_file(&self, file: &StageFile) -> PipelineResult<EnrichOutcome> {
        let content = fs::read_to_string(&file.path).map_err(|e| PipelineError::io(&file.path, e))?;
        let note = Note::parse(&content);

        if let Some(filter) = &self.filter {
            if !filter.matches(&note.metadata) {
                debug!("{} does not match filter {}", file.file_name, filter);
                return Ok(EnrichOutcome::Filtered);
            }
        }

        info!("Processing note: {}", file.file_name);
        let prompt = self.prompt.fill(&content);
        let response = self
            .provider
            .complete(&prompt, &self.params)
            .await
            .map_err(|e| PipelineError::transport(&file.path, e))?;

        let metadata = extract_model_metadata(&response);
        debug!("Model metadata for {}: {} byte(s)", file.file_name, metadata.len());

        let enriched = note.with_metadata(metadata);
        let output = self
            .output
            .write(&self.output_name(&file.path), &enriched.to_text())?;
        info!("Saved enriched note to {}", output.display());
        Ok(EnrichOutcome::Written(output))
    }

    fn output_name(&self, source: &Path) -> String {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.extension.starts_with('.') || self.extension.is_empty() {
            format!("{stem}{}", self.extension)
        } else {
            format!("{stem}.{}", self.extension)
        }
    }
}
