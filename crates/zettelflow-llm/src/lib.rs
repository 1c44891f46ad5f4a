//! # zettelflow LLM providers
//!
//! HTTP implementations of [`zettelflow_core::CompletionProvider`]:
//!
//! - [`chat::OpenAICompletionProvider`]: any OpenAI-compatible
//!   `/chat/completions` endpoint, streaming over server-sent events
//! - [`chat::OllamaCompletionProvider`]: a local Ollama server, streaming
//!   newline-delimited JSON
//!
//! [`create_completion_provider`] picks one from the `[llm]` configuration.
//! With the `test-utils` feature, [`mock::MockCompletionProvider`] provides a
//! scripted provider for tests.

#![warn(clippy::all)]

pub mod chat;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use chat::{create_completion_provider, OllamaCompletionProvider, OpenAICompletionProvider};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockCall, MockCallType, MockCompletionProvider};
