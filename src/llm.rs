//! Provider abstraction
//!
//! The conversation core talks to the provider only through these traits, so
//! the HTTP implementation and test doubles are interchangeable.

mod error;
mod openai;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use openai::OpenAIService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Stateless request/response call against the responses endpoint
#[async_trait]
pub trait ResponsesTransport: Send + Sync {
    async fn create_response(&self, request: &TurnRequest) -> Result<TurnResponse, LlmError>;
}

/// One-shot chat completions
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;
}

#[async_trait]
impl<T: ResponsesTransport + ?Sized> ResponsesTransport for Arc<T> {
    async fn create_response(&self, request: &TurnRequest) -> Result<TurnResponse, LlmError> {
        (**self).create_response(request).await
    }
}

#[async_trait]
impl<T: LlmService + ?Sized> LlmService for Arc<T> {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        (**self).complete(request).await
    }
}

/// Logging wrapper for provider calls
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

fn log_failure(endpoint: &str, model: &str, duration_ms: u128, e: &LlmError) {
    tracing::error!(
        endpoint,
        model = %model,
        duration_ms = %duration_ms,
        error = %e.message,
        kind = e.kind.as_str(),
        retryable = e.kind.is_retryable(),
        "Provider request failed"
    );
}

#[async_trait]
impl<T: ResponsesTransport> ResponsesTransport for LoggingTransport<T> {
    async fn create_response(&self, request: &TurnRequest) -> Result<TurnResponse, LlmError> {
        let start = Instant::now();
        let result = self.inner.create_response(request).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(response) => {
                let usage = response.usage.unwrap_or_default();
                tracing::info!(
                    endpoint = "responses",
                    model = %response.model,
                    duration_ms = %duration_ms,
                    chained = request.previous_response_id.is_some(),
                    retrieval = request.tools.is_some(),
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    sources = response.sources.len(),
                    "Provider request completed"
                );
            }
            Err(e) => log_failure("responses", &request.model, duration_ms, e),
        }

        result
    }
}

#[async_trait]
impl<T: LlmService> LlmService for LoggingTransport<T> {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let start = Instant::now();
        let result = self.inner.complete(request).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(response) => {
                let usage = response.usage.unwrap_or_default();
                tracing::info!(
                    endpoint = "chat",
                    model = %response.model,
                    duration_ms = %duration_ms,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Provider request completed"
                );
            }
            Err(e) => log_failure("chat", &request.model, duration_ms, e),
        }

        result
    }
}
