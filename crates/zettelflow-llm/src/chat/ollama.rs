//! Ollama completion provider
//!
//! Talks to `/api/chat` with a single user message. Streaming responses are
//! newline-delimited JSON objects, the last one carrying `"done": true`.

use super::lines::LineBuffer;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use zettelflow_core::{CompletionParams, CompletionProvider, LlmError, LlmResult};

/// Ollama completion provider
pub struct OllamaCompletionProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OllamaCompletionProvider {
    /// Create a new Ollama provider
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn request_body(prompt: &str, params: &CompletionParams, stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": params.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": stream,
            "options": {
                "temperature": params.temperature,
                "num_predict": params.max_tokens,
            },
        })
    }
}

#[async_trait]
impl CompletionProvider for OllamaCompletionProvider {
    async fn complete(&self, prompt: &str, params: &CompletionParams) -> LlmResult<String> {
        debug!("Ollama completion with model {}", params.model);

        let response = self
            .client
            .post(self.chat_url())
            .json(&Self::request_body(prompt, params, false))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| LlmError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::InvalidResponse(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(ollama_response.message.content)
    }

    fn complete_stream(
        &self,
        prompt: String,
        params: CompletionParams,
    ) -> BoxStream<'_, LlmResult<String>> {
        use async_stream::stream;
        use futures::StreamExt;

        let url = self.chat_url();
        let body = Self::request_body(&prompt, &params, true);
        let client = self.client.clone();
        let timeout = self.timeout;

        Box::pin(stream! {
            let response = client
                .post(&url)
                .json(&body)
                .timeout(timeout)
                .send()
                .await;

            match response {
                Ok(res) if res.status().is_success() => {
                    let mut bytes = res.bytes_stream();
                    let mut buffer = LineBuffer::new();
                    let mut finished = false;

                    while let Some(chunk_result) = bytes.next().await {
                        match chunk_result {
                            Ok(chunk) => {
                                buffer.push(&chunk);
                                while let Some(line) = buffer.next_line() {
                                    match parse_stream_line(&line) {
                                        Ok(StreamLine::Fragment(text)) => {
                                            yield Ok(text);
                                        }
                                        Ok(StreamLine::Done) => {
                                            finished = true;
                                            break;
                                        }
                                        Ok(StreamLine::Skip) => {}
                                        Err(e) => {
                                            yield Err(e);
                                            return;
                                        }
                                    }
                                }
                                if finished {
                                    break;
                                }
                            }
                            Err(e) => {
                                yield Err(LlmError::StreamError(e.to_string()));
                                return;
                            }
                        }
                    }

                    if !finished {
                        if let Some(line) = buffer.finish() {
                            match parse_stream_line(&line) {
                                Ok(StreamLine::Fragment(text)) => {
                                    yield Ok(text);
                                }
                                Ok(_) => {}
                                Err(e) => {
                                    yield Err(e);
                                }
                            }
                        }
                    }
                }
                Ok(res) => {
                    let status = res.status();
                    let error_text = res.text().await.unwrap_or_default();
                    yield Err(LlmError::InvalidResponse(format!(
                        "Ollama API error ({}): {}",
                        status, error_text
                    )));
                }
                Err(e) => {
                    yield Err(LlmError::HttpError(e.to_string()));
                }
            }
        })
    }

    fn provider_name(&self) -> &str {
        "Ollama"
    }
}

enum StreamLine {
    Fragment(String),
    Done,
    Skip,
}

fn parse_stream_line(line: &str) -> LlmResult<StreamLine> {
    if line.is_empty() {
        return Ok(StreamLine::Skip);
    }

    let parsed: OllamaStreamResponse = serde_json::from_str(line)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse stream: {}", e)))?;

    if let Some(error) = parsed.error {
        return Err(LlmError::StreamError(error));
    }

    let content = parsed.message.map(|m| m.content).unwrap_or_default();
    if parsed.done {
        // the final object may still carry text
        if content.is_empty() {
            return Ok(StreamLine::Done);
        }
        return Ok(StreamLine::Fragment(content));
    }
    if content.is_empty() {
        Ok(StreamLine::Skip)
    } else {
        Ok(StreamLine::Fragment(content))
    }
}

// Ollama API response types
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaStreamResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_creation_trims_trailing_slash() {
        let provider = OllamaCompletionProvider::new("http://localhost:11434/", 120);
        assert_eq!(provider.provider_name(), "Ollama");
        assert_eq!(provider.base_url(), "http://localhost:11434");
        assert_eq!(provider.chat_url(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn request_body_carries_sampling_options() {
        let params = CompletionParams::new("llama3.2", 0.5, 256);
        let body = OllamaCompletionProvider::request_body("hi", &params, true);
        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(body["options"]["num_predict"], 256);
    }

    #[test]
    fn stream_lines() {
        assert!(matches!(
            parse_stream_line(r#"{"message":{"role":"assistant","content":"Hi"},"done":false}"#),
            Ok(StreamLine::Fragment(t)) if t == "Hi"
        ));
        assert!(matches!(
            parse_stream_line(r#"{"message":{"role":"assistant","content":""},"done":true}"#),
            Ok(StreamLine::Done)
        ));
        assert!(matches!(
            parse_stream_line(r#"{"error":"model not loaded"}"#),
            Err(LlmError::StreamError(_))
        ));
        assert!(matches!(
            parse_stream_line("not json"),
            Err(LlmError::InvalidResponse(_))
        ));
    }
}
