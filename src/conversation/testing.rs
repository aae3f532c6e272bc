//! Provider test doubles
//!
//! These mocks let the conversation client and API be tested without I/O.

use crate::llm::{
    ChatRequest, ChatResponse, LlmError, LlmService, ResponsesTransport, TokenUsage, TurnRequest,
    TurnResponse,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock responses transport
// ============================================================================

/// Mock transport that returns queued results, or a generated success
/// (`resp_1`, `resp_2`, ...) when nothing is queued
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<TurnResponse, LlmError>>>,
    delay: Option<Duration>,
    issued: AtomicUsize,
    completed: AtomicUsize,
    /// Record of all requests made
    pub requests: Mutex<Vec<TurnRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            delay: None,
            issued: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_response(&self, response: TurnResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<TurnRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of calls that ran to completion (success or error)
    pub fn completed_calls(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Canned successful response
pub fn turn_response(id: &str, text: &str) -> TurnResponse {
    TurnResponse {
        id: id.to_string(),
        text: text.to_string(),
        model: "gpt-4o-mini".to_string(),
        sources: Vec::new(),
        usage: Some(TokenUsage {
            prompt_tokens: 12,
            completion_tokens: 8,
            total_tokens: 20,
        }),
    }
}

#[async_trait]
impl ResponsesTransport for MockTransport {
    async fn create_response(&self, request: &TurnRequest) -> Result<TurnResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self.responses.lock().unwrap().pop_front();
        let result = queued.unwrap_or_else(|| {
            Ok(TurnResponse {
                id: format!("resp_{n}"),
                text: format!("echo: {}", request.input),
                model: request.model.clone(),
                sources: Vec::new(),
                usage: None,
            })
        });
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

// ============================================================================
// Mock chat service
// ============================================================================

/// Mock chat service that echoes the prompt unless an error is queued
pub struct MockLlmService {
    errors: Mutex<VecDeque<LlmError>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            errors: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_error(&self, error: LlmError) {
        self.errors.lock().unwrap().push_back(error);
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockLlmService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(error) = self.errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(ChatResponse {
            text: format!("answer to: {}", request.prompt),
            model: request.model.clone(),
            finish_reason: Some("stop".to_string()),
            usage: None,
        })
    }
}
