//! Completion service abstraction
//!
//! Stage drivers talk to a language model only through [`CompletionProvider`].
//! Concrete HTTP providers live in `zettelflow-llm`.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;

/// Result type for completion calls
pub type LlmResult<T> = Result<T, LlmError>;

/// Completion service errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Stream interrupted: {0}")]
    StreamError(String),
}

/// Sampling parameters for one completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionParams {
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
        }
    }
}

/// A single-prompt text completion service
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a full completion
    async fn complete(&self, prompt: &str, params: &CompletionParams) -> LlmResult<String>;

    /// Request a completion as a stream of text fragments.
    ///
    /// An `Err` item ends the stream; fragments received before it are not a
    /// complete response.
    fn complete_stream(
        &self,
        prompt: String,
        params: CompletionParams,
    ) -> BoxStream<'_, LlmResult<String>>;

    /// Name shown in logs and banners
    fn provider_name(&self) -> &str;
}

/// Drain a fragment stream, handing each fragment to `on_fragment` in arrival
/// order, and return the concatenated text.
pub async fn collect_stream<F>(
    mut stream: BoxStream<'_, LlmResult<String>>,
    mut on_fragment: F,
) -> LlmResult<String>
where
    F: FnMut(&str),
{
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        on_fragment(&fragment);
        text.push_str(&fragment);
    }
    Ok(text)
}
