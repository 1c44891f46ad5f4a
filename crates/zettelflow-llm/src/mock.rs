//! Mock completion provider for testing
//!
//! Returns scripted responses chosen by prompt content, records every call,
//! and can inject failures both before a response and in the middle of a
//! stream. No network access.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use zettelflow_core::{CompletionParams, CompletionProvider, LlmError, LlmResult};

/// Record of a mock provider call
#[derive(Debug, Clone)]
pub struct MockCall {
    pub call_type: MockCallType,
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Type of mock provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCallType {
    Complete,
    CompleteStream,
}

#[derive(Debug, Clone)]
enum Script {
    Respond(String),
    Fail(String),
}

/// Scripted completion provider
///
/// Rules are matched in insertion order against the prompt; the first rule
/// whose needle occurs in the prompt wins. Unmatched prompts get the default
/// response.
pub struct MockCompletionProvider {
    rules: Mutex<Vec<(String, Script)>>,
    delays: Mutex<Vec<(String, Duration)>>,
    default_response: String,
    fragment_size: usize,
    fail_stream_after: Option<usize>,
    call_history: Mutex<Vec<MockCall>>,
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            delays: Mutex::new(Vec::new()),
            default_response: "This is a mock response.".to_string(),
            fragment_size: 8,
            fail_stream_after: None,
            call_history: Mutex::new(Vec::new()),
        }
    }

    /// Response for prompts that match no rule
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Size in characters of streamed fragments
    pub fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = size.max(1);
        self
    }

    /// Make every stream fail after emitting `fragments` fragments
    pub fn with_stream_failure_after(mut self, fragments: usize) -> Self {
        self.fail_stream_after = Some(fragments);
        self
    }

    /// Respond with `response` to prompts containing `needle`
    pub fn respond_when(&self, needle: &str, response: &str) {
        lock(&self.rules).push((needle.to_string(), Script::Respond(response.to_string())));
    }

    /// Fail prompts containing `needle` with an HTTP error
    pub fn fail_when(&self, needle: &str, message: &str) {
        lock(&self.rules).push((needle.to_string(), Script::Fail(message.to_string())));
    }

    /// Delay the answer to prompts containing `needle`
    pub fn delay_when(&self, needle: &str, delay: Duration) {
        lock(&self.delays).push((needle.to_string(), delay));
    }

    /// Get the call history for verification
    pub fn call_history(&self) -> Vec<MockCall> {
        lock(&self.call_history).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.call_history).len()
    }

    fn record(&self, call_type: MockCallType, prompt: &str, params: &CompletionParams) {
        lock(&self.call_history).push(MockCall {
            call_type,
            prompt: prompt.to_string(),
            model: params.model.clone(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        });
    }

    fn script_for(&self, prompt: &str) -> Script {
        lock(&self.rules)
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, script)| script.clone())
            .unwrap_or_else(|| Script::Respond(self.default_response.clone()))
    }

    fn delay_for(&self, prompt: &str) -> Option<Duration> {
        lock(&self.delays)
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, delay)| *delay)
    }

    fn fragments(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.fragment_size)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, prompt: &str, params: &CompletionParams) -> LlmResult<String> {
        self.record(MockCallType::Complete, prompt, params);
        if let Some(delay) = self.delay_for(prompt) {
            tokio::time::sleep(delay).await;
        }
        match self.script_for(prompt) {
            Script::Respond(text) => Ok(text),
            Script::Fail(message) => Err(LlmError::HttpError(message)),
        }
    }

    fn complete_stream(
        &self,
        prompt: String,
        params: CompletionParams,
    ) -> BoxStream<'_, LlmResult<String>> {
        self.record(MockCallType::CompleteStream, &prompt, &params);

        let items: Vec<LlmResult<String>> = match self.script_for(&prompt) {
            Script::Fail(message) => vec![Err(LlmError::HttpError(message))],
            Script::Respond(text) => {
                let mut items: Vec<LlmResult<String>> =
                    self.fragments(&text).into_iter().map(Ok).collect();
                if let Some(after) = self.fail_stream_after {
                    items.truncate(after);
                    items.push(Err(LlmError::StreamError(
                        "connection reset by mock".to_string(),
                    )));
                }
                items
            }
        };

        stream::iter(items).boxed()
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zettelflow_core::collect_stream;

    fn params() -> CompletionParams {
        CompletionParams::new("mock-model", 0.3, 64)
    }

    #[tokio::test]
    async fn scripted_responses_by_prompt_content() {
        let mock = MockCompletionProvider::new().with_default_response("fallback");
        mock.respond_when("alpha", "A");
        mock.fail_when("broken", "boom");

        assert_eq!(mock.complete("about alpha", &params()).await.unwrap(), "A");
        assert_eq!(mock.complete("other", &params()).await.unwrap(), "fallback");
        assert!(matches!(
            mock.complete("broken input", &params()).await,
            Err(LlmError::HttpError(_))
        ));

        let history = mock.call_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].model, "mock-model");
        assert_eq!(history[0].call_type, MockCallType::Complete);
    }

    #[tokio::test]
    async fn stream_splits_into_fragments() {
        let mock = MockCompletionProvider::new()
            .with_default_response("Hello world")
            .with_fragment_size(4);

        let mut fragments = Vec::new();
        let text = collect_stream(mock.complete_stream("hi".into(), params()), |f| {
            fragments.push(f.to_string())
        })
        .await
        .unwrap();

        assert_eq!(text, "Hello world");
        assert_eq!(fragments, vec!["Hell", "o wo", "rld"]);
        assert_eq!(mock.call_history()[0].call_type, MockCallType::CompleteStream);
    }

    #[tokio::test]
    async fn stream_failure_after_fragments() {
        let mock = MockCompletionProvider::new()
            .with_default_response("Hello world")
            .with_fragment_size(4)
            .with_stream_failure_after(1);

        let mut seen = 0;
        let result = collect_stream(mock.complete_stream("hi".into(), params()), |_| seen += 1).await;

        assert!(matches!(result, Err(LlmError::StreamError(_))));
        assert_eq!(seen, 1);
    }
}
