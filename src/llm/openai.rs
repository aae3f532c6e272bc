//! `OpenAI` provider implementation
//!
//! Turns go through the v1/responses endpoint, which keeps conversation
//! context server-side and chains it via `previous_response_id`. One-shot
//! modules use chat/completions.

use super::types::{ChatRequest, ChatResponse, TokenUsage, TurnRequest, TurnResponse};
use super::{LlmError, LlmService, ResponsesTransport};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIService {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST a JSON body and return the raw success body
    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String, LlmError> {
        let url = format!("{}/{path}", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::timeout(format!("Timed out reading response: {e}"))
            } else {
                LlmError::network(format!("Failed to read response: {e}"))
            }
        })?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<OpenAIErrorResponse>(&body) {
                return Err(LlmError::from_status(status.as_u16(), &error_resp.error.message));
            }
            return Err(LlmError::from_status(status.as_u16(), &body));
        }

        Ok(body)
    }

    fn translate_chat_request(request: &ChatRequest) -> ChatApiRequest {
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatApiMessage {
                role: "system".to_string(),
                content: Some(request.system.clone()),
            });
        }
        messages.push(ChatApiMessage {
            role: "user".to_string(),
            content: Some(request.prompt.clone()),
        });

        ChatApiRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl ResponsesTransport for OpenAIService {
    async fn create_response(&self, request: &TurnRequest) -> Result<TurnResponse, LlmError> {
        let body = self.post_json("responses", request).await?;
        let parsed: ResponsesApiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;
        normalize_responses_api_response(parsed, &request.model)
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let chat_request = Self::translate_chat_request(request);
        let body = self.post_json("chat/completions", &chat_request).await?;
        let parsed: ChatApiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;
        normalize_chat_response(parsed, &request.model)
    }
}

/// Normalize a responses-endpoint payload.
///
/// Prefers the top-level `output_text` convenience field; otherwise joins the
/// `output_text` parts of every message item. Sources are collected from file
/// citations and file-search results, first occurrence wins.
pub(super) fn normalize_responses_api_response(
    resp: ResponsesApiResponse,
    requested_model: &str,
) -> Result<TurnResponse, LlmError> {
    if resp.id.is_empty() {
        return Err(LlmError::unknown("Response is missing an id"));
    }

    let mut text_parts = Vec::new();
    let mut sources: Vec<String> = Vec::new();
    let mut push_source = |name: String| {
        if !name.is_empty() && !sources.contains(&name) {
            sources.push(name);
        }
    };

    for item in resp.output {
        match item.r#type.as_str() {
            "message" => {
                for part in item.content.unwrap_or_default() {
                    if part.r#type != "output_text" {
                        continue;
                    }
                    for annotation in part.annotations {
                        if annotation.r#type == "file_citation" {
                            if let Some(name) = annotation.filename.or(annotation.file_id) {
                                push_source(name);
                            }
                        }
                    }
                    if let Some(text) = part.text {
                        text_parts.push(text);
                    }
                }
            }
            "file_search_call" => {
                for result in item.results.unwrap_or_default() {
                    if let Some(name) = result.filename.or(result.file_id) {
                        push_source(name);
                    }
                }
            }
            other => {
                tracing::debug!(output_type = %other, "Ignoring output item");
            }
        }
    }

    let text = resp.output_text.unwrap_or_else(|| text_parts.join(""));

    Ok(TurnResponse {
        id: resp.id,
        text,
        model: resp
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| requested_model.to_string()),
        sources,
        usage: resp.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.total_tokens.unwrap_or(u.input_tokens + u.output_tokens),
        }),
    })
}

pub(super) fn normalize_chat_response(
    resp: ChatApiResponse,
    requested_model: &str,
) -> Result<ChatResponse, LlmError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::unknown("No choices in response"))?;

    Ok(ChatResponse {
        text: choice.message.content.unwrap_or_default(),
        model: resp
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| requested_model.to_string()),
        finish_reason: choice.finish_reason,
        usage: resp.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

// Chat completions API types

#[derive(Debug, Serialize)]
struct ChatApiRequest {
    model: String,
    messages: Vec<ChatApiMessage>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ChatApiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatApiResponse {
    choices: Vec<ChatApiChoice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<ChatApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatApiChoice {
    message: ChatApiMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct ChatApiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

// Responses API types

#[derive(Debug, Deserialize)]
pub(super) struct ResponsesApiResponse {
    id: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<ResponsesApiOutput>,
    #[serde(default)]
    usage: Option<ResponsesApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiOutput {
    r#type: String,
    /// For message outputs
    #[serde(default)]
    content: Option<Vec<ResponsesApiContent>>,
    /// For `file_search_call` outputs
    #[serde(default)]
    results: Option<Vec<FileSearchResult>>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiContent {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    annotations: Vec<ResponsesApiAnnotation>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiAnnotation {
    r#type: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileSearchResult {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiUsage {
    input_tokens: u64,
    output_tokens: u64,
    #[serde(default)]
    total_tokens: Option<u64>,
}
