//! API request and response types

use crate::conversation::SendOptions;
use crate::llm::TokenUsage;
use crate::modules::{ModuleInfo, ModuleSettings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to send a turn on a conversation
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    /// Per-turn overrides; unset fields come from the RAG module's settings
    #[serde(flatten)]
    pub options: SendOptions,
}

/// Question for a one-shot module
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Response with the module catalog
#[derive(Debug, Serialize)]
pub struct ModulesResponse {
    pub modules: &'static [ModuleInfo],
}

/// Response with a module's settings
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub module_id: String,
    pub settings: ModuleSettings,
    /// False when the module still runs on defaults
    pub customized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Answer from a one-shot module
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub text: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Response for the knowledge-base listing
#[derive(Debug, Serialize)]
pub struct KnowledgeBasesResponse {
    pub knowledge_bases: Vec<&'static str>,
    pub default: &'static str,
    /// Settings value that disables retrieval
    pub disabled: &'static str,
}

/// Response for conversation allocation
#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub conversation_id: String,
}

/// Response for a completed turn
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub text: String,
    pub model: String,
    pub continuation_token: String,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Application info
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub default_model: String,
    pub default_temperature: f64,
    pub default_top_k: u32,
    pub has_api_key: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, kind: &'static str) -> Self {
        Self {
            error: message.into(),
            kind,
        }
    }
}
