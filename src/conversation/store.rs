//! In-memory conversation store
//!
//! Maps a conversation id to its continuation state. Nothing is persisted:
//! the provider already holds the conversation context server-side.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Continuation state of one conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    /// Id of the latest provider response, chained into the next turn
    pub continuation_token: Option<String>,
    pub initialized: bool,
    pub updated_at: DateTime<Utc>,
}

impl ConversationEntry {
    pub fn initialized(continuation_token: impl Into<String>) -> Self {
        Self {
            continuation_token: Some(continuation_token.into()),
            initialized: true,
            updated_at: Utc::now(),
        }
    }
}

/// Conversation store, created once per application instance
#[derive(Debug, Default)]
pub struct ConversationStore {
    entries: RwLock<HashMap<String, ConversationEntry>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, conversation_id: &str) -> Option<ConversationEntry> {
        self.entries.read().await.get(conversation_id).cloned()
    }

    /// Replace the whole entry
    pub async fn set(&self, conversation_id: &str, entry: ConversationEntry) {
        self.entries
            .write()
            .await
            .insert(conversation_id.to_string(), entry);
    }

    /// Remove the entry; returns whether one existed
    pub async fn delete(&self, conversation_id: &str) -> bool {
        self.entries.write().await.remove(conversation_id).is_some()
    }

    #[allow(dead_code)] // Used in tests
    pub async fn has(&self, conversation_id: &str) -> bool {
        self.entries.read().await.contains_key(conversation_id)
    }

    #[allow(dead_code)] // Used in tests
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
