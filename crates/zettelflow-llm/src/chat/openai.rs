//! OpenAI-compatible completion provider
//!
//! Sends one user message to `{base_url}/chat/completions`. Streaming uses
//! server-sent events: `data: {json}` lines terminated by `data: [DONE]`.

use super::lines::LineBuffer;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use zettelflow_core::{CompletionParams, CompletionProvider, LlmError, LlmResult};

/// OpenAI completion provider
pub struct OpenAICompletionProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAICompletionProvider {
    /// Create a new OpenAI provider
    pub fn new(api_key: String, base_url: Option<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body(prompt: &str, params: &CompletionParams, stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": params.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": params.temperature,
            "max_completion_tokens": params.max_tokens,
            "stream": stream,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompletionProvider {
    async fn complete(&self, prompt: &str, params: &CompletionParams) -> LlmResult<String> {
        debug!("OpenAI completion with model {}", params.model);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
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
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        openai_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))
    }

    fn complete_stream(
        &self,
        prompt: String,
        params: CompletionParams,
    ) -> BoxStream<'_, LlmResult<String>> {
        use async_stream::stream;
        use futures::StreamExt;

        let url = self.completions_url();
        let body = Self::request_body(&prompt, &params, true);
        let auth = format!("Bearer {}", self.api_key);
        let client = self.client.clone();
        let timeout = self.timeout;

        Box::pin(stream! {
            let response = client
                .post(&url)
                .header("Authorization", auth)
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
                                    match parse_sse_line(&line) {
                                        Ok(SseLine::Fragment(text)) => {
                                            yield Ok(text);
                                        }
                                        Ok(SseLine::Done) => {
                                            finished = true;
                                            break;
                                        }
                                        Ok(SseLine::Skip) => {}
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
                            match parse_sse_line(&line) {
                                Ok(SseLine::Fragment(text)) => {
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
                        "OpenAI API error ({}): {}",
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
        "OpenAI"
    }
}

enum SseLine {
    Fragment(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> LlmResult<SseLine> {
    // comments, `event:` and `id:` lines carry no text
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(SseLine::Skip);
    }
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let chunk: OpenAIStreamChunk = serde_json::from_str(data)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse stream: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(LlmError::StreamError(error.message));
    }

    let text: String = chunk
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.content)
        .collect();

    if text.is_empty() {
        Ok(SseLine::Skip)
    } else {
        Ok(SseLine::Fragment(text))
    }
}

// OpenAI API response types
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
    #[serde(default)]
    error: Option<OpenAIErrorBody>,
}

#[derive(Debug, Deserialize)]
struct OpenAIStreamChoice {
    delta: OpenAIDelta,
}

#[derive(Debug, Deserialize)]
struct OpenAIDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorBody {
    message: String,
}
