use anyhow::Result;
use std::io;

use crate::output;
use zettelflow_config::ZettelConfig;
use zettelflow_pipeline::SplitDriver;

/// Execute the split command
pub fn execute(config: &ZettelConfig, preview: bool) -> Result<()> {
    let driver = SplitDriver::new(config)?;
    output::info(format!(
        "Splitting files in {} on '{}'",
        config.ingest_dir().display(),
        driver.delimiter()
    ));

    if preview {
        let stdout = io::stdout();
        let report = driver.preview(&mut stdout.lock())?;
        output::info(format!(
            "Previewed {} file(s); nothing was written",
            report.processed.len()
        ));
        return super::finish(&report);
    }

    let report = driver.run()?;
    if report.is_empty() {
        output::info("No files to split.");
        return Ok(());
    }

    output::success(format!(
        "Split {} file(s) into {} note(s) in {}",
        report.processed.len(),
        report.outputs.len(),
        config.split_dir().display()
    ));
    super::finish(&report)
}
