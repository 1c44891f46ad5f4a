//! Split stage: ingest files to one rendered note per chunk

use crate::report::{config_error, ErrorPolicy, RunReport};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};
use zettelflow_config::ZettelConfig;
use zettelflow_core::stage::note_file_name;
use zettelflow_core::{
    Chunker, NoteRenderer, PipelineError, PipelineResult, RunClock, StageDir, StageFile,
};

/// A rendered note that has not been written yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNote {
    pub file_name: String,
    pub index: usize,
    pub text: String,
}

/// Splits every eligible ingest file into notes and retires the source
pub struct SplitDriver {
    source: StageDir,
    output: StageDir,
    chunker: Chunker,
    renderer: NoteRenderer,
    extension: String,
    policy: ErrorPolicy,
    clock: RunClock,
}

impl SplitDriver {
    /// Create a driver using the configured note template
    pub fn new(config: &ZettelConfig) -> PipelineResult<Self> {
        config.validate_split().map_err(config_error)?;
        let renderer = NoteRenderer::from_file(&config.note_template_path())?;
        Self::with_renderer(config, renderer)
    }

    /// Create a driver with an already compiled template
    pub fn with_renderer(config: &ZettelConfig, renderer: NoteRenderer) -> PipelineResult<Self> {
        Ok(Self {
            source: StageDir::new(config.ingest_dir()),
            output: StageDir::new(config.split_dir()),
            chunker: Chunker::new(config.split.delimiter.clone())?,
            renderer,
            extension: config.split.output_extension.clone(),
            policy: ErrorPolicy::from_halt_on_error(config.pipeline.halt_on_error),
            clock: RunClock::new(),
        })
    }

    pub fn delimiter(&self) -> &str {
        self.chunker.delimiter()
    }

    /// Split all eligible ingest files, write the notes and retire each source
    pub fn run(&self) -> PipelineResult<RunReport> {
        let files = self.source.list_eligible(None)?;
        self.output.ensure_exists()?;
        info!("Splitting {} file(s) from {}", files.len(), self.source.path().display());

        let mut report = RunReport::new();
        for file in files {
            match self.split_file(&file) {
                Ok(outputs) => report.record_success(&file.path, outputs),
                Err(e) => report.record_failure(&file.path, e, self.policy)?,
            }
        }
        Ok(report)
    }

    /// Render every eligible file into `sink` without writing or retiring
    pub fn preview<W: Write>(&self, sink: &mut W) -> PipelineResult<RunReport> {
        let files = self.source.list_eligible(None)?;
        let mut report = RunReport::new();

        for file in files {
            let notes = match self.render_file(&file) {
                Ok(notes) => notes,
                Err(e) => {
                    report.record_failure(&file.path, e, self.policy)?;
                    continue;
                }
            };

            for note in &notes {
                writeln!(sink, "==> {} <== {}", file.file_name, note.file_name)
                    .and_then(|_| writeln!(sink, "{}", note.text))
                    .map_err(|e| PipelineError::io(&file.path, e))?;
            }
            report.record_success(&file.path, Vec::new());
        }
        Ok(report)
    }

    /// Read and render one ingest file
    pub fn render_file(&self, file: &StageFile) -> PipelineResult<Vec<RenderedNote>> {
        let text = fs::read_to_string(&file.path).map_err(|e| PipelineError::io(&file.path, e))?;
        let stamp = self.next_stamp();

        self.chunker
            .split(&text)
            .iter()
            .map(|chunk| {
                debug!("Rendering chunk {} of {}", chunk.index, file.file_name);
                Ok(RenderedNote {
                    file_name: note_file_name(&stamp, chunk.index, &self.extension),
                    index: chunk.index,
                    text: self.renderer.render(chunk)?,
                })
            })
            .collect()
    }

    /// A timestamp no earlier source of this driver used and no existing
    /// note in the split directory carries
    fn next_stamp(&self) -> String {
        self.clock
            .next_stamp(|ts| self.output.has_entry_with_prefix(&format!("note_{ts}_")))
    }

    fn split_file(&self, file: &StageFile) -> PipelineResult<Vec<PathBuf>> {
        info!("Processing file: {}", file.file_name);

        // all notes are rendered before the first one is written
        let notes = self.render_file(file)?;

        let mut outputs = Vec::with_capacity(notes.len());
        for note in &notes {
            let path = self.output.write_new(&note.file_name, &note.text)?;
            debug!("Created note {}", path.display());
            outputs.push(path);
        }

        let retired = self.source.retire(&file.path)?;
        info!(
            "Split {} into {} note(s), moved to {}",
            file.file_name,
            outputs.len(),
            retired.display()
        );
        Ok(outputs)
    }
}
