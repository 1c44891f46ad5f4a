//! Shared helpers for provider integration tests

#![allow(dead_code)]

use futures::StreamExt;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zettelflow_core::{CompletionParams, LlmError, LlmResult};

pub fn test_params() -> CompletionParams {
    CompletionParams::new("test-model", 0.7, 100)
}

/// Drain a stream, returning the text seen and the first error, if any
pub async fn collect_stream_with_error(
    mut stream: futures::stream::BoxStream<'_, LlmResult<String>>,
) -> (String, Option<LlmError>) {
    let mut content = String::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => content.push_str(&fragment),
            Err(e) => return (content, Some(e)),
        }
    }
    (content, None)
}

// ============================================================================
// OpenAI server-sent events
// ============================================================================

pub fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    body.push_str("data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n");
    for fragment in fragments {
        let chunk = serde_json::json!({
            "choices": [{ "index": 0, "delta": { "content": fragment } }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

pub fn openai_completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8 }
    })
}

pub async fn openai_stream_server(body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;
    server
}

// ============================================================================
// Ollama NDJSON
// ============================================================================

pub fn ndjson_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let line = serde_json::json!({
            "model": "test-model",
            "message": { "role": "assistant", "content": fragment },
            "done": false
        });
        body.push_str(&format!("{}\n", line));
    }
    let last = serde_json::json!({
        "model": "test-model",
        "message": { "role": "assistant", "content": "" },
        "done": true,
        "done_reason": "stop"
    });
    body.push_str(&format!("{}\n", last));
    body
}

pub async fn ollama_server(body: String, delay: Option<Duration>) -> MockServer {
    let server = MockServer::start().await;
    let mut template = ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson");
    if let Some(delay) = delay {
        template = template.set_delay(delay);
    }
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

pub async fn error_server(route: &str, status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}
