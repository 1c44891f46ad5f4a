//! Completion provider implementations

mod lines;
pub mod ollama;
pub mod openai;

// Re-export providers
pub use ollama::OllamaCompletionProvider;
pub use openai::OpenAICompletionProvider;

use std::sync::Arc;
use tracing::debug;
use zettelflow_config::{LlmSettings, ProviderKind};
use zettelflow_core::{CompletionProvider, LlmError, LlmResult};

/// Create a completion provider from configuration
pub fn create_completion_provider(
    settings: &LlmSettings,
) -> LlmResult<Arc<dyn CompletionProvider>> {
    let endpoint = settings.endpoint();
    debug!("Using {} provider at {}", settings.provider, endpoint);

    match settings.provider {
        ProviderKind::Ollama => {
            let provider = OllamaCompletionProvider::new(endpoint, settings.timeout_secs);
            Ok(Arc::new(provider))
        }
        ProviderKind::OpenAI => {
            let api_key = settings
                .api_key()
                .ok_or_else(|| LlmError::ConfigError("llm.api_key is not set".to_string()))?;

            let provider = OpenAICompletionProvider::new(
                api_key.to_string(),
                Some(endpoint),
                settings.timeout_secs,
            );
            Ok(Arc::new(provider))
        }
    }
}
