//! HTTP API
//!
//! Thin JSON surface over the module catalog, module settings and the
//! conversation client.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::conversation::ConversationClient;
use crate::db::Database;
use crate::llm::LlmService;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub conversations: ConversationClient,
    pub db: Database,
    pub llm: Arc<dyn LlmService>,
    /// Limit for one-shot module calls
    pub request_timeout: Duration,
    pub has_api_key: bool,
}

impl AppState {
    pub fn new(
        conversations: ConversationClient,
        db: Database,
        llm: Arc<dyn LlmService>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            conversations,
            db,
            llm,
            request_timeout,
            // The client cannot be built without a credential
            has_api_key: true,
        }
    }
}
