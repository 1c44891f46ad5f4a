use anyhow::{bail, Result};

use crate::cli::StageArg;
use crate::output;
use zettelflow_config::ZettelConfig;
use zettelflow_core::StageDir;

/// Execute the clean command
pub fn execute(config: &ZettelConfig, stage: StageArg, dry_run: bool) -> Result<()> {
    let mut failed = 0;

    for stage in stage.stages() {
        let dir = StageDir::new(config.stage_dir(stage));
        if !dir.path().is_dir() {
            output::info(format!(
                "{} directory {} does not exist",
                stage,
                dir.path().display()
            ));
            continue;
        }

        let outcome = dir.clean(dry_run)?;
        for path in &outcome.removed {
            if dry_run {
                println!("  would remove {}", path.display());
            } else {
                println!("  removed {}", path.display());
            }
        }
        for (path, reason) in &outcome.failed {
            output::error(format!("Could not remove {}: {}", path.display(), reason));
        }
        failed += outcome.failed.len();

        if dry_run {
            output::info(format!(
                "{} file(s) would be removed from {}",
                outcome.removed.len(),
                stage
            ));
        } else {
            output::success(format!(
                "Removed {} file(s) from {}",
                outcome.removed.len(),
                stage
            ));
        }
    }

    if failed > 0 {
        bail!("{} file(s) could not be removed", failed);
    }
    Ok(())
}
