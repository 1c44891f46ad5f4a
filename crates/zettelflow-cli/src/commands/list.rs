use anyhow::Result;
use colored::Colorize;

use crate::cli::StageArg;
use crate::output;
use zettelflow_config::{StageName, ZettelConfig};
use zettelflow_core::StageDir;

/// Execute the list command
pub fn execute(config: &ZettelConfig, stage: StageArg) -> Result<()> {
    for stage in stage.stages() {
        let dir = StageDir::new(config.stage_dir(stage));
        output::section(&format!("{} ({})", stage, dir.path().display()));

        if !dir.path().is_dir() {
            println!("  {}", "directory does not exist".dimmed());
            continue;
        }

        // split lists what enrich would pick up
        let extension = match stage {
            StageName::Split => Some(config.split.output_extension.as_str()),
            StageName::Ingest | StageName::Enrich => None,
        };

        let files = dir.list_eligible(extension)?;
        if files.is_empty() {
            println!("  {}", "(empty)".dimmed());
        }
        for file in &files {
            println!("  {}", file.file_name);
        }
    }
    Ok(())
}
