//! Common types for provider interactions

use serde::{Deserialize, Serialize};

/// A single turn sent to the responses endpoint.
///
/// Serializes directly to the provider's wire shape. Optional fields are
/// omitted entirely when absent: providers treat a missing `tools` field
/// differently from an empty list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnRequest {
    pub model: String,
    pub input: String,
    pub instructions: String,
    pub temperature: f64,
    pub store: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<RetrievalTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// File-search tool directive pointing at one knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalTool {
    pub r#type: &'static str,
    pub vector_store_ids: Vec<String>,
    pub max_num_results: u32,
}

impl RetrievalTool {
    pub fn file_search(vector_store_id: impl Into<String>, max_num_results: u32) -> Self {
        Self {
            r#type: "file_search",
            vector_store_ids: vec![vector_store_id.into()],
            max_num_results,
        }
    }
}

/// Normalized result of one responses-endpoint call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResponse {
    /// Provider-assigned response id; the next turn's continuation token
    pub id: String,
    pub text: String,
    pub model: String,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// One-shot chat completion request (no server-side continuity)
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

/// One-shot chat completion result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub text: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}
