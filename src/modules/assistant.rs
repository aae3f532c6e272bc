//! One-shot assistants
//!
//! The chat and oracle modules answer a single question with no
//! server-side continuity.

use super::{ModuleInfo, ModuleKind, ModuleSettings};
use crate::llm::{ChatRequest, ChatResponse, LlmError, LlmErrorKind, LlmService};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

pub const CHATBOT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Provide clear, concise, and helpful responses.";

pub const ORACLE_SYSTEM_PROMPT: &str = "You are a wise bibliomantic oracle that provides insights through literary interpretation.

When given a question, you should:
1. Provide a mystical, literary-inspired interpretation
2. Reference fictional or real literary works that relate to the question
3. Offer deep, metaphorical guidance
4. Use poetic and inspiring language
5. End with a meaningful quote or passage

Your responses should feel magical and insightful, as if drawing wisdom from the collective knowledge of all books ever written.";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Question must not be empty")]
    EmptyQuestion,
    #[error("Module {0} does not answer questions")]
    NotAskable(String),
    #[error("Provider call failed: {0}")]
    Provider(#[source] LlmError),
    #[error("Provider call timed out after {after:?}")]
    Timeout { after: Duration },
}

/// Build the chat request a module sends for `question`
fn build_request(
    module: &ModuleInfo,
    settings: &ModuleSettings,
    question: &str,
) -> Result<ChatRequest, AssistantError> {
    let (default_system, prompt) = match module.kind {
        ModuleKind::Chat => (CHATBOT_SYSTEM_PROMPT, question.to_string()),
        ModuleKind::Oracle => (
            ORACLE_SYSTEM_PROMPT,
            format!("Question for bibliomantic insight: \"{question}\""),
        ),
        _ => return Err(AssistantError::NotAskable(module.id.to_string())),
    };

    Ok(ChatRequest {
        model: settings.model.clone(),
        system: settings.instructions().unwrap_or(default_system).to_string(),
        prompt,
        temperature: settings.temperature,
        max_tokens: Some(settings.max_tokens),
    })
}

/// Ask a one-shot module a question
pub async fn ask(
    llm: &dyn LlmService,
    module: &ModuleInfo,
    settings: &ModuleSettings,
    question: &str,
    limit: Duration,
) -> Result<ChatResponse, AssistantError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AssistantError::EmptyQuestion);
    }
    let request = build_request(module, settings, question)?;

    match timeout(limit, llm.complete(&request)).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) if e.kind == LlmErrorKind::Timeout => {
            tracing::warn!(module = module.id, "Assistant call timed out");
            Err(AssistantError::Timeout { after: limit })
        }
        Ok(Err(e)) => {
            tracing::warn!(module = module.id, error = %e.message, "Assistant call failed");
            Err(AssistantError::Provider(e))
        }
        Err(_) => {
            tracing::warn!(module = module.id, "Assistant call timed out");
            Err(AssistantError::Timeout { after: limit })
        }
    }
}
