//! Ingest stage: raw text to `ingest_<timestamp>.txt` via a streamed completion

use crate::input::{InputSource, InputUnit};
use crate::report::{config_error, ErrorPolicy, RunReport};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use zettelflow_config::ZettelConfig;
use zettelflow_core::stage::ingest_file_name;
use zettelflow_core::{
    collect_stream, CompletionParams, CompletionProvider, PipelineError, PipelineResult,
    PromptTemplate, RunClock, StageDir, INGEST_PLACEHOLDER,
};

/// Sends input text through the ingest prompt and stores the model's answer
/// in the ingest directory.
pub struct IngestDriver {
    provider: Arc<dyn CompletionProvider>,
    prompt: PromptTemplate,
    params: CompletionParams,
    output: StageDir,
    policy: ErrorPolicy,
    clock: RunClock,
}

impl IngestDriver {
    /// Create a driver using the configured ingest prompt file
    pub fn new(config: &ZettelConfig, provider: Arc<dyn CompletionProvider>) -> PipelineResult<Self> {
        config.validate_ingest().map_err(config_error)?;
        let prompt = PromptTemplate::load(&config.ingest_prompt_path(), INGEST_PLACEHOLDER)?;
        Ok(Self::with_prompt(config, provider, prompt))
    }

    /// Create a driver with an already loaded prompt
    pub fn with_prompt(
        config: &ZettelConfig,
        provider: Arc<dyn CompletionProvider>,
        prompt: PromptTemplate,
    ) -> Self {
        let settings = &config.ingest;
        Self {
            provider,
            prompt,
            params: CompletionParams::new(
                settings.model.clone(),
                settings.temperature,
                settings.max_completion_tokens,
            ),
            output: StageDir::new(config.ingest_dir()),
            policy: ErrorPolicy::from_halt_on_error(config.pipeline.halt_on_error),
            clock: RunClock::new(),
        }
    }

    pub fn params(&self) -> &CompletionParams {
        &self.params
    }

    pub fn output_dir(&self) -> &StageDir {
        &self.output
    }

    /// Ingest everything `source` provides.
    ///
    /// `stdin` is only read for stdin sources. Each fragment of the streamed
    /// answer is handed to `on_fragment` as it arrives; the file is written
    /// once the stream has ended.
    pub async fn run<R, F>(
        &self,
        source: &InputSource,
        stdin: R,
        mut on_fragment: F,
    ) -> PipelineResult<RunReport>
    where
        R: BufRead,
        F: FnMut(&str),
    {
        self.output.ensure_exists()?;
        let mut report = RunReport::new();

        if source.is_stdin() {
            let unit = InputUnit::read_stdin(stdin)?;
            self.process(&unit, &mut report, &mut on_fragment).await?;
            return Ok(report);
        }

        for path in source.files()? {
            let unit = match InputUnit::read_file(&path) {
                Ok(unit) => unit,
                Err(e) => {
                    report.record_failure(&path, e, self.policy)?;
                    continue;
                }
            };
            self.process(&unit, &mut report, &mut on_fragment).await?;
        }

        Ok(report)
    }

    async fn process<F>(
        &self,
        unit: &InputUnit,
        report: &mut RunReport,
        on_fragment: &mut F,
    ) -> PipelineResult<()>
    where
        F: FnMut(&str),
    {
        if unit.is_blank() {
            warn!("No text in {}, skipping", unit.origin.display());
            report.record_skip(&unit.origin);
            return Ok(());
        }

        match self.ingest(unit, on_fragment).await {
            Ok(output) => {
                report.record_success(&unit.origin, vec![output]);
                Ok(())
            }
            Err(e) => report.record_failure(&unit.origin, e, self.policy),
        }
    }

    /// Ingest a single unit and return the written file
    pub async fn ingest<F>(&self, unit: &InputUnit, on_fragment: &mut F) -> PipelineResult<PathBuf>
    where
        F: FnMut(&str),
    {
        info!("Ingesting {}", unit.origin.display());

        let prompt = self.prompt.fill(&unit.text);
        debug!(
            "Streaming {} completion with model {}",
            self.provider.provider_name(),
            self.params.model
        );

        let stream = self.provider.complete_stream(prompt, self.params.clone());
        let text = collect_stream(stream, |fragment| on_fragment(fragment))
            .await
            .map_err(|e| PipelineError::transport(&unit.origin, e))?;

        let stamp = self.clock.next_stamp(|ts| {
            let name = ingest_file_name(ts);
            self.output.path().join(&name).exists()
                || self.output.processed_dir().join(&name).exists()
        });
        let output = self.output.write_new(&ingest_file_name(&stamp), &text)?;
        info!("Saved ingested text to {}", output.display());
        Ok(output)
    }
}
