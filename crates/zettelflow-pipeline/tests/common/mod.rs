//! Common test utilities for pipeline tests.

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use zettelflow_config::{write_default_assets, ZettelConfig};
use zettelflow_llm::MockCompletionProvider;

/// A throwaway config directory and data directories.
///
/// The temp directory must be kept alive for the duration of the test.
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub config: ZettelConfig,
}

impl TestWorkspace {
    pub fn ingest_dir(&self) -> PathBuf {
        self.config.ingest_dir()
    }

    pub fn split_dir(&self) -> PathBuf {
        self.config.split_dir()
    }

    pub fn enrich_dir(&self) -> PathBuf {
        self.config.enrich_dir()
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.ingest_dir().join("processed")
    }
}

/// Create a workspace with the default prompts and template and the given
/// extra TOML appended to the generated configuration.
pub fn create_workspace(extra_toml: &str) -> Result<TestWorkspace> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    let config_dir = root.join("config");
    write_default_assets(&config_dir, false)?;

    let toml = format!(
        r#"
[paths]
ingest = "{root}/data/ingest"
split = "{root}/data/split"
enrich = "{root}/data/enrich"
logs = "{root}/data/logs"

[llm]
provider = "ollama"

{extra_toml}
"#,
        root = root.display().to_string().replace('\\', "/"),
    );
    let config = ZettelConfig::from_toml_str(&toml, &config_dir)?;

    for dir in [config.ingest_dir(), config.split_dir(), config.enrich_dir()] {
        fs::create_dir_all(dir)?;
    }

    Ok(TestWorkspace { temp_dir, config })
}

/// Write a file into `dir` and return its path
pub fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}

/// Sorted names of the direct files in `dir`
pub fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

pub fn mock_provider(default_response: &str) -> Arc<MockCompletionProvider> {
    Arc::new(MockCompletionProvider::new().with_default_response(default_response))
}
