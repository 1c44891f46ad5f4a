//! Shared fixtures for CLI tests

#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables that would leak settings from the developer's shell
const SCRUBBED_ENV: &[&str] = &[
    "ZETTELFLOW_INGEST_MODEL",
    "ZETTELFLOW_ENRICH_MODEL",
    "ZETTELFLOW_LLM_ENDPOINT",
    "ZETTELFLOW_API_KEY",
    "OPENAI_API_KEY",
    "RUST_LOG",
];

/// An isolated home, config directory and data root
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl TestEnv {
    /// Create an environment whose config file holds `llm_section` below the
    /// generated `[paths]` table
    pub fn new(llm_section: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let config_dir = temp_dir.path().join("config");
        let data_dir = temp_dir.path().join("data");
        fs::create_dir_all(&config_dir)?;

        let data = data_dir.display().to_string().replace('\\', "/");
        let config = format!(
            "[paths]\ningest = \"{data}/ingest\"\nsplit = \"{data}/split\"\nenrich = \"{data}/enrich\"\nlogs = \"{data}/logs\"\n\n{llm_section}\n"
        );
        fs::write(config_dir.join("config.toml"), config)?;

        Ok(Self {
            temp_dir,
            config_dir,
            data_dir,
        })
    }

    /// Environment using a local Ollama endpoint
    pub fn ollama(endpoint: &str) -> Result<Self> {
        Self::new(&format!(
            "[llm]\nprovider = \"ollama\"\nendpoint = \"{endpoint}\"\ntimeout_secs = 5"
        ))
    }

    pub fn stage_dir(&self, stage: &str) -> PathBuf {
        self.data_dir.join(stage)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// The binary, pointed at this environment, with empty piped stdin
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("zettelflow").unwrap();
        for var in SCRUBBED_ENV {
            cmd.env_remove(var);
        }
        cmd.env("ZETTELFLOW_CONFIG_DIR", &self.config_dir)
            .env("HOME", self.temp_dir.path())
            .env("NO_COLOR", "1")
            .write_stdin("");
        cmd
    }

    /// Create the data directories without going through first-run setup
    pub fn create_stage_dirs(&self) -> Result<()> {
        for stage in ["ingest", "split", "enrich", "logs"] {
            fs::create_dir_all(self.stage_dir(stage))?;
        }
        Ok(())
    }
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}

/// Sorted names of the direct files in `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
