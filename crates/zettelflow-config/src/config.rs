//! Configuration model and layered loading
//!
//! Precedence, lowest first: built-in defaults, `config.toml`, environment
//! variables, then explicit overrides from the command line.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that relocates the configuration directory
pub const CONFIG_DIR_ENV: &str = "ZETTELFLOW_CONFIG_DIR";

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const INGEST_PROMPT_FILE: &str = "default_ingest.md";
pub const ENRICH_PROMPT_FILE: &str = "default_enrich.md";
pub const NOTE_TEMPLATE_FILE: &str = "note_header.hbs";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REDACTED: &str = "********";

/// The three pipeline stages, each backed by one data directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageName {
    Ingest,
    Split,
    Enrich,
}

impl StageName {
    pub const ALL: [StageName; 3] = [StageName::Ingest, StageName::Split, StageName::Enrich];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Ingest => "ingest",
            StageName::Split => "split",
            StageName::Enrich => "enrich",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions` API
    #[default]
    OpenAI,
    /// Local Ollama server
    Ollama,
}

impl ProviderKind {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "https://api.openai.com/v1",
            ProviderKind::Ollama => "http://localhost:11434",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderKind::OpenAI)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAI => f.write_str("openai"),
            ProviderKind::Ollama => f.write_str("ollama"),
        }
    }
}

/// Data and asset locations. Values may start with `~`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub ingest: String,
    pub split: String,
    pub enrich: String,
    pub logs: String,
    /// Defaults to `<config_dir>/prompts`
    pub prompts: Option<String>,
    /// Defaults to `<config_dir>/templates`
    pub templates: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ingest: "~/zettelflow/ingest".to_string(),
            split: "~/zettelflow/split".to_string(),
            enrich: "~/zettelflow/enrich".to_string(),
            logs: "~/zettelflow/logs".to_string(),
            prompts: None,
            templates: None,
        }
    }
}

/// Completion service connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    /// Base URL; the provider default is used when unset
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            endpoint: None,
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl LlmSettings {
    /// Configured endpoint, or the provider's default
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_endpoint().to_string())
    }

    /// API key, ignoring empty strings
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestSettings {
    pub model: String,
    pub temperature: f32,
    pub max_completion_tokens: u32,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_completion_tokens: 4096,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplitSettings {
    /// Literal chunk separator
    pub delimiter: String,
    /// Extension of generated notes, including the dot
    pub output_extension: String,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            delimiter: "###".to_string(),
            output_extension: ".md".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnrichSettings {
    pub model: String,
    pub temperature: f32,
    pub max_completion_tokens: u32,
    /// Concurrent completion requests
    pub parallel: usize,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_completion_tokens: 1024,
            parallel: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    /// Stop a stage at the first per-file failure
    pub halt_on_error: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            halt_on_error: true,
        }
    }
}

/// Values from the command line, applied last
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub ingest_model: Option<String>,
    pub enrich_model: Option<String>,
    pub delimiter: Option<String>,
    pub parallel: Option<usize>,
    pub halt_on_error: Option<bool>,
}

/// Complete zettelflow configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZettelConfig {
    pub paths: PathsConfig,
    pub llm: LlmSettings,
    pub ingest: IngestSettings,
    pub split: SplitSettings,
    pub enrich: EnrichSettings,
    pub pipeline: PipelineSettings,

    #[serde(skip)]
    config_dir: PathBuf,
    #[serde(skip)]
    config_path: PathBuf,
}

impl ZettelConfig {
    /// Load configuration with precedence: defaults < file < env < overrides.
    ///
    /// Without an explicit `config_file` the file is looked up in
    /// [`default_config_dir`] and may be absent. An explicit file must exist.
    pub fn load(config_file: Option<PathBuf>, overrides: &ConfigOverrides) -> ConfigResult<Self> {
        let (config_dir, config_path, required) = match config_file {
            Some(path) => {
                let dir = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                (dir, path, true)
            }
            None => {
                let dir = default_config_dir()?;
                let path = dir.join(CONFIG_FILE_NAME);
                (dir, path, false)
            }
        };

        let mut config = Self::from_file_or_default(&config_path, required)?;
        config.config_dir = config_dir;
        config.config_path = config_path;

        config.apply_env();
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Parse configuration text, resolving relative asset directories
    /// against `config_dir`
    pub fn from_toml_str(contents: &str, config_dir: &Path) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(contents)?;
        config.config_dir = config_dir.to_path_buf();
        config.config_path = config_dir.join(CONFIG_FILE_NAME);
        Ok(config)
    }

    fn from_file_or_default(path: &Path, required: bool) -> ConfigResult<Self> {
        if !path.exists() && !required {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config file {}", path.display());
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) {
        if let Some(model) = env_value("ZETTELFLOW_INGEST_MODEL") {
            self.ingest.model = model;
        }
        if let Some(model) = env_value("ZETTELFLOW_ENRICH_MODEL") {
            self.enrich.model = model;
        }
        if let Some(endpoint) = env_value("ZETTELFLOW_LLM_ENDPOINT") {
            self.llm.endpoint = Some(endpoint);
        }
        if let Some(key) = env_value("ZETTELFLOW_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if self.llm.api_key().is_none() {
            if let Some(key) = env_value("OPENAI_API_KEY") {
                self.llm.api_key = Some(key);
            }
        }
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(model) = &overrides.ingest_model {
            self.ingest.model = model.clone();
        }
        if let Some(model) = &overrides.enrich_model {
            self.enrich.model = model.clone();
        }
        if let Some(delimiter) = &overrides.delimiter {
            self.split.delimiter = delimiter.clone();
        }
        if let Some(parallel) = overrides.parallel {
            self.enrich.parallel = parallel;
        }
        if let Some(halt) = overrides.halt_on_error {
            self.pipeline.halt_on_error = halt;
        }
    }

    /// Directory holding the config file, prompts and templates
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the config file this configuration was loaded from (or would be)
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn ingest_dir(&self) -> PathBuf {
        expand_path(&self.paths.ingest)
    }

    pub fn split_dir(&self) -> PathBuf {
        expand_path(&self.paths.split)
    }

    pub fn enrich_dir(&self) -> PathBuf {
        expand_path(&self.paths.enrich)
    }

    pub fn logs_dir(&self) -> PathBuf {
        expand_path(&self.paths.logs)
    }

    pub fn stage_dir(&self, stage: StageName) -> PathBuf {
        match stage {
            StageName::Ingest => self.ingest_dir(),
            StageName::Split => self.split_dir(),
            StageName::Enrich => self.enrich_dir(),
        }
    }

    /// Every data directory the pipeline writes into
    pub fn data_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.ingest_dir(),
            self.split_dir(),
            self.enrich_dir(),
            self.logs_dir(),
        ]
    }

    pub fn prompts_dir(&self) -> PathBuf {
        match &self.paths.prompts {
            Some(dir) if !dir.trim().is_empty() => expand_path(dir),
            _ => self.config_dir.join("prompts"),
        }
    }

    pub fn templates_dir(&self) -> PathBuf {
        match &self.paths.templates {
            Some(dir) if !dir.trim().is_empty() => expand_path(dir),
            _ => self.config_dir.join("templates"),
        }
    }

    pub fn ingest_prompt_path(&self) -> PathBuf {
        self.prompts_dir().join(INGEST_PROMPT_FILE)
    }

    pub fn enrich_prompt_path(&self) -> PathBuf {
        self.prompts_dir().join(ENRICH_PROMPT_FILE)
    }

    pub fn note_template_path(&self) -> PathBuf {
        self.templates_dir().join(NOTE_TEMPLATE_FILE)
    }

    /// Check the settings the ingest stage needs
    pub fn validate_ingest(&self) -> ConfigResult<()> {
        require("ingest.model", &self.ingest.model)?;
        require("paths.ingest", &self.paths.ingest)?;
        self.validate_credentials()
    }

    /// Check the settings the split stage needs
    pub fn validate_split(&self) -> ConfigResult<()> {
        require("split.delimiter", &self.split.delimiter)?;
        require("paths.ingest", &self.paths.ingest)?;
        require("paths.split", &self.paths.split)
    }

    /// Check the settings the enrich stage needs
    pub fn validate_enrich(&self) -> ConfigResult<()> {
        require("enrich.model", &self.enrich.model)?;
        require("paths.split", &self.paths.split)?;
        require("paths.enrich", &self.paths.enrich)?;
        if self.enrich.parallel == 0 {
            return Err(ConfigError::missing("enrich.parallel (must be at least 1)"));
        }
        self.validate_credentials()
    }

    /// The configured provider has what it needs to authenticate
    pub fn validate_credentials(&self) -> ConfigResult<()> {
        if self.llm.provider.requires_api_key() && self.llm.api_key().is_none() {
            return Err(ConfigError::missing("llm.api_key"));
        }
        Ok(())
    }

    /// Copy of the configuration safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.llm.api_key().is_some() {
            config.llm.api_key = Some(REDACTED.to_string());
        }
        config
    }

    /// Display the configuration as TOML, with secrets redacted
    pub fn display_as_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(&self.redacted())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Display the configuration as JSON, with secrets redacted
    pub fn display_as_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(&self.redacted())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

/// `$ZETTELFLOW_CONFIG_DIR`, else `~/.config/zettelflow`
pub fn default_config_dir() -> ConfigResult<PathBuf> {
    if let Some(dir) = env_value(CONFIG_DIR_ENV) {
        return Ok(expand_path(&dir));
    }
    let home = dirs::home_dir().ok_or(ConfigError::HomeDir)?;
    Ok(home.join(".config").join("zettelflow"))
}

/// Default location of `config.toml`
pub fn default_config_path() -> ConfigResult<PathBuf> {
    Ok(default_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Expand a leading `~` to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn require(name: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        Err(ConfigError::missing(name))
    } else {
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
