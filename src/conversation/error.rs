//! Conversation client errors

use crate::llm::LlmError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Conversation {0} is already initialized")]
    AlreadyInitialized(String),
    #[error("Conversation {0} is not initialized; call initialize first")]
    NotInitialized(String),
    #[error("Message must not be empty")]
    EmptyMessage,
    #[error("Provider call failed: {0}")]
    ProviderCall(#[source] LlmError),
    #[error("Provider call timed out after {after:?}")]
    ProviderTimeout { after: Duration },
    #[error("Turn task ended unexpectedly: {0}")]
    TaskAborted(String),
}

impl ConversationError {
    /// Stable machine-readable name, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized(_) => "already_initialized",
            Self::NotInitialized(_) => "not_initialized",
            Self::EmptyMessage => "empty_message",
            Self::ProviderCall(_) => "provider_call",
            Self::ProviderTimeout { .. } => "provider_timeout",
            Self::TaskAborted(_) => "task_aborted",
        }
    }
}
