//! First-run scaffolding and persisted settings
//!
//! Default assets are compiled into the binary and written into the
//! configuration directory the first time zettelflow runs there.

use crate::config::{
    ZettelConfig, CONFIG_FILE_NAME, ENRICH_PROMPT_FILE, INGEST_PROMPT_FILE,
    NOTE_TEMPLATE_FILE,
};
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG: &str = include_str!("../assets/config.toml");
pub const DEFAULT_INGEST_PROMPT: &str = include_str!("../assets/prompts/default_ingest.md");
pub const DEFAULT_ENRICH_PROMPT: &str = include_str!("../assets/prompts/default_enrich.md");
pub const DEFAULT_NOTE_TEMPLATE: &str = include_str!("../assets/templates/note_header.hbs");

/// What scaffolding created
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

impl ScaffoldReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}

/// Whether `config_dir` has never been initialized.
///
/// A missing prompts directory is taken as a first run or a broken install.
pub fn needs_first_run(config_dir: &Path) -> bool {
    !config_dir.join("prompts").exists()
}

/// Initialize the configuration directory of `config` if it has never been
/// set up.
///
/// Writes the default assets next to the config file (keeping an existing
/// `config.toml`) and creates the data directories `config` points at.
/// Returns `None` when the directory was already initialized.
pub fn first_run_init(config: &ZettelConfig) -> ConfigResult<Option<ScaffoldReport>> {
    let config_dir = config.config_dir();
    if !needs_first_run(config_dir) {
        return Ok(None);
    }

    info!("Initializing configuration in {}", config_dir.display());
    let mut report = write_default_assets(config_dir, false)?;
    report.dirs.extend(create_data_dirs(config)?);

    Ok(Some(report))
}

/// Write the default config, prompts and template into `config_dir`.
///
/// Existing files are kept unless `force` is set.
pub fn write_default_assets(config_dir: &Path, force: bool) -> ConfigResult<ScaffoldReport> {
    let assets = [
        (PathBuf::from(CONFIG_FILE_NAME), DEFAULT_CONFIG),
        (
            Path::new("prompts").join(INGEST_PROMPT_FILE),
            DEFAULT_INGEST_PROMPT,
        ),
        (
            Path::new("prompts").join(ENRICH_PROMPT_FILE),
            DEFAULT_ENRICH_PROMPT,
        ),
        (
            Path::new("templates").join(NOTE_TEMPLATE_FILE),
            DEFAULT_NOTE_TEMPLATE,
        ),
    ];

    let mut report = ScaffoldReport::default();
    for (relative, contents) in assets {
        let target = config_dir.join(relative);
        if target.exists() && !force {
            debug!("Keeping existing {}", target.display());
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        std::fs::write(&target, contents).map_err(|e| ConfigError::io(&target, e))?;
        debug!("Created {}", target.display());
        report.files.push(target);
    }
    Ok(report)
}

/// Create every missing data directory, returning the ones created
pub fn create_data_dirs(config: &ZettelConfig) -> ConfigResult<Vec<PathBuf>> {
    let mut created = Vec::new();
    for dir in config.data_dirs() {
        if dir.exists() {
            continue;
        }
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::io(&dir, e))?;
        created.push(dir);
    }
    Ok(created)
}

/// Store `api_key` under `[llm]` in the config file at `path`.
///
/// Other settings and sections are preserved. The file is created if missing
/// and restricted to the owner on unix.
pub fn persist_api_key(path: &Path, api_key: &str) -> ConfigResult<()> {
    let mut table = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<toml::Table>(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        toml::Table::new()
    };

    let llm = table
        .entry("llm")
        .or_insert(toml::Value::Table(toml::Table::new()));
    if !llm.is_table() {
        *llm = toml::Value::Table(toml::Table::new());
    }
    if let toml::Value::Table(llm) = llm {
        llm.insert(
            "api_key".to_string(),
            toml::Value::String(api_key.to_string()),
        );
    }

    let rendered =
        toml::to_string_pretty(&table).map_err(|e| ConfigError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }
    std::fs::write(path, rendered).map_err(|e| ConfigError::io(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms).map_err(|e| ConfigError::io(path, e))?;
    }

    info!("Saved API key to {}", path.display());
    Ok(())
}
