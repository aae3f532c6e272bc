//! Conversation client
//!
//! Two-phase contract around the stateless responses endpoint: a conversation
//! must be initialized exactly once, after which every turn chains onto the
//! previous response id. Turns for the same conversation are serialized, and
//! the store update of a turn survives the caller abandoning it.

use super::knowledge_base::{self, DEFAULT_KNOWLEDGE_BASE};
use super::request::{build_turn_request, TurnInputs, DEFAULT_QUERY_LABEL};
use super::store::{ConversationEntry, ConversationStore};
use super::{
    ConversationError, DEFAULT_INSTRUCTIONS, DEFAULT_TEMPERATURE, DEFAULT_TOP_K,
    ONBOARDING_INSTRUCTIONS, WELCOME_MESSAGE,
};
use crate::config::{AppConfig, DEFAULT_MODEL};
use crate::llm::{LlmErrorKind, ResponsesTransport, TurnRequest, TurnResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

/// Values used when a turn does not override them
#[derive(Debug, Clone)]
pub struct ClientDefaults {
    pub model: String,
    pub temperature: f64,
    pub instructions: String,
    pub knowledge_base: String,
    pub top_k: u32,
    pub query_label: String,
    pub timeout: Duration,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            knowledge_base: DEFAULT_KNOWLEDGE_BASE.to_string(),
            top_k: DEFAULT_TOP_K,
            query_label: DEFAULT_QUERY_LABEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl ClientDefaults {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            query_label: config.query_label.clone(),
            timeout: config.request_timeout,
            ..Self::default()
        }
    }
}

/// Per-turn overrides; `None` takes the client default
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendOptions {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub instructions: Option<String>,
    pub pre_prompt: Option<String>,
    /// Registry name, or "None" to disable retrieval
    pub knowledge_base: Option<String>,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

/// Result of a successful initialization turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializeResult {
    pub text: String,
    pub model: String,
    pub continuation_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationStatus {
    pub exists: bool,
    pub initialized: bool,
    pub continuation_token: Option<String>,
}

/// One async mutex per conversation id
#[derive(Debug, Default)]
struct TurnLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TurnLocks {
    async fn acquire(&self, conversation_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(conversation_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the lock for an id nobody is holding or waiting on
    fn prune(&self, conversation_id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(conversation_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(conversation_id);
        }
    }

    /// Unlock and forget the id unless another turn is queued on it
    fn release(&self, guard: OwnedMutexGuard<()>, conversation_id: &str) {
        drop(guard);
        self.prune(conversation_id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Conversation client, constructed once at startup
#[derive(Clone)]
pub struct ConversationClient {
    transport: Arc<dyn ResponsesTransport>,
    store: Arc<ConversationStore>,
    locks: Arc<TurnLocks>,
    defaults: Arc<ClientDefaults>,
}

impl ConversationClient {
    pub fn new(
        transport: Arc<dyn ResponsesTransport>,
        store: Arc<ConversationStore>,
        defaults: ClientDefaults,
    ) -> Self {
        Self {
            transport,
            store,
            locks: Arc::new(TurnLocks::default()),
            defaults: Arc::new(defaults),
        }
    }

    pub fn defaults(&self) -> &ClientDefaults {
        &self.defaults
    }

    /// Run the mandatory first turn of a conversation
    pub async fn initialize(
        &self,
        conversation_id: &str,
    ) -> Result<InitializeResult, ConversationError> {
        let guard = self.locks.acquire(conversation_id).await;

        if self
            .store
            .get(conversation_id)
            .await
            .is_some_and(|entry| entry.initialized)
        {
            self.locks.release(guard, conversation_id);
            return Err(ConversationError::AlreadyInitialized(
                conversation_id.to_string(),
            ));
        }

        // Fixed onboarding turn: no pre-prompt, no retrieval, no predecessor
        let request = build_turn_request(TurnInputs {
            model: &self.defaults.model,
            message: WELCOME_MESSAGE,
            pre_prompt: None,
            query_label: &self.defaults.query_label,
            instructions: ONBOARDING_INSTRUCTIONS,
            temperature: self.defaults.temperature,
            continuation_token: None,
            retrieval: None,
            max_output_tokens: None,
        });

        let response = self.run_turn(conversation_id, guard, request).await?;
        tracing::info!(
            conversation_id = %conversation_id,
            continuation_token = %response.id,
            "Conversation initialized"
        );

        Ok(InitializeResult {
            text: response.text,
            model: response.model,
            continuation_token: response.id,
        })
    }

    /// Send one user turn on an initialized conversation
    pub async fn send(
        &self,
        conversation_id: &str,
        message: &str,
        options: &SendOptions,
    ) -> Result<TurnResponse, ConversationError> {
        if message.trim().is_empty() {
            return Err(ConversationError::EmptyMessage);
        }

        let guard = self.locks.acquire(conversation_id).await;

        let continuation_token = match self.store.get(conversation_id).await {
            Some(ConversationEntry {
                initialized: true,
                continuation_token: Some(token),
                ..
            }) => token,
            _ => {
                self.locks.release(guard, conversation_id);
                return Err(ConversationError::NotInitialized(
                    conversation_id.to_string(),
                ))
            }
        };

        let defaults = &self.defaults;
        let knowledge_base = options
            .knowledge_base
            .as_deref()
            .unwrap_or(&defaults.knowledge_base);
        let retrieval =
            knowledge_base::retrieval_for(knowledge_base, options.top_k.unwrap_or(defaults.top_k));

        let request = build_turn_request(TurnInputs {
            model: options.model.as_deref().unwrap_or(&defaults.model),
            message,
            pre_prompt: options.pre_prompt.as_deref(),
            query_label: &defaults.query_label,
            instructions: options
                .instructions
                .as_deref()
                .unwrap_or(&defaults.instructions),
            temperature: options.temperature.unwrap_or(defaults.temperature),
            continuation_token: Some(&continuation_token),
            retrieval,
            max_output_tokens: options.max_output_tokens,
        });

        let response = self.run_turn(conversation_id, guard, request).await?;
        tracing::info!(
            conversation_id = %conversation_id,
            knowledge_base = %knowledge_base,
            continuation_token = %response.id,
            sources = response.sources.len(),
            "Turn completed"
        );

        Ok(response)
    }

    /// Forget a conversation. Idempotent.
    pub async fn reset(&self, conversation_id: &str) {
        // Wait out any in-flight turn so it cannot re-create the entry
        let guard = self.locks.acquire(conversation_id).await;
        let existed = self.store.delete(conversation_id).await;
        self.locks.release(guard, conversation_id);

        tracing::info!(conversation_id = %conversation_id, existed, "Conversation reset");
    }

    pub async fn status(&self, conversation_id: &str) -> ConversationStatus {
        match self.store.get(conversation_id).await {
            Some(entry) => ConversationStatus {
                exists: true,
                initialized: entry.initialized,
                continuation_token: entry.continuation_token,
            },
            None => ConversationStatus {
                exists: false,
                initialized: false,
                continuation_token: None,
            },
        }
    }

    pub fn knowledge_bases(&self) -> Vec<&'static str> {
        knowledge_base::names()
    }

    /// Call the provider and record the new continuation token.
    ///
    /// Runs on a spawned task that owns the conversation's turn lock, so the
    /// store update and lock release still happen if the caller's future is
    /// dropped. On any failure the store is left untouched.
    async fn run_turn(
        &self,
        conversation_id: &str,
        guard: OwnedMutexGuard<()>,
        request: TurnRequest,
    ) -> Result<TurnResponse, ConversationError> {
        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.store);
        let locks = Arc::clone(&self.locks);
        let timeout = self.defaults.timeout;
        let conversation_id = conversation_id.to_string();

        let task = tokio::spawn(async move {
            let result =
                record_turn(transport.as_ref(), &store, timeout, &conversation_id, &request).await;
            locks.release(guard, &conversation_id);
            result
        });

        task.await
            .map_err(|e| ConversationError::TaskAborted(e.to_string()))?
    }
}

async fn record_turn(
    transport: &dyn ResponsesTransport,
    store: &ConversationStore,
    timeout: Duration,
    conversation_id: &str,
    request: &TurnRequest,
) -> Result<TurnResponse, ConversationError> {
    let response = match tokio::time::timeout(timeout, transport.create_response(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) if e.kind == LlmErrorKind::Timeout => {
            tracing::warn!(conversation_id = %conversation_id, error = %e, "Provider call timed out");
            return Err(ConversationError::ProviderTimeout { after: timeout });
        }
        Ok(Err(e)) => {
            tracing::warn!(conversation_id = %conversation_id, error = %e, "Provider call failed");
            return Err(ConversationError::ProviderCall(e));
        }
        Err(_) => {
            tracing::warn!(
                conversation_id = %conversation_id,
                timeout_ms = %timeout.as_millis(),
                "Provider call timed out"
            );
            return Err(ConversationError::ProviderTimeout { after: timeout });
        }
    };

    store
        .set(conversation_id, ConversationEntry::initialized(response.id.clone()))
        .await;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::testing::{turn_response, MockTransport};
    use crate::llm::LlmError;

    fn client_with(transport: Arc<MockTransport>) -> (ConversationClient, Arc<ConversationStore>) {
        let store = Arc::new(ConversationStore::new());
        let client = ConversationClient::new(transport, Arc::clone(&store), ClientDefaults::default());
        (client, store)
    }

    #[tokio::test]
    async fn test_send_before_initialize_fails() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(Arc::clone(&transport));

        let err = client
            .send("c1", "Oi", &SendOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::NotInitialized(ref id) if id == "c1"));
        assert!(transport.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_sends_fixed_onboarding_turn() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_response(turn_response("resp_T0", "Bem-vindo"));
        let (client, store) = client_with(Arc::clone(&transport));

        let result = client.initialize("c1").await.unwrap();
        assert_eq!(result.text, "Bem-vindo");
        assert_eq!(result.continuation_token, "resp_T0");

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].input, WELCOME_MESSAGE);
        assert_eq!(requests[0].instructions, ONBOARDING_INSTRUCTIONS);
        assert!(requests[0].previous_response_id.is_none());
        assert!(requests[0].tools.is_none());
        assert!(requests[0].store);

        let entry = store.get("c1").await.unwrap();
        assert!(entry.initialized);
        assert_eq!(entry.continuation_token.as_deref(), Some("resp_T0"));
    }

    #[tokio::test]
    async fn test_double_initialize_fails_and_keeps_state() {
        let transport = Arc::new(MockTransport::new());
        let (client, store) = client_with(Arc::clone(&transport));

        client.initialize("c1").await.unwrap();
        let after_first = store.get("c1").await.unwrap();

        let err = client.initialize("c1").await.unwrap_err();
        assert!(matches!(err, ConversationError::AlreadyInitialized(_)));
        assert_eq!(store.get("c1").await.unwrap(), after_first);
        assert_eq!(transport.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_initialize_leaves_no_state_and_can_retry() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_error(LlmError::server_error("boom"));
        let (client, store) = client_with(Arc::clone(&transport));

        let err = client.initialize("c1").await.unwrap_err();
        assert!(matches!(err, ConversationError::ProviderCall(_)));
        assert!(!store.has("c1").await);

        client.initialize("c1").await.unwrap();
        assert!(client.status("c1").await.initialized);
    }

    #[tokio::test]
    async fn test_end_to_end_rag_turn() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_response(turn_response("resp_T0", "Olá"));
        transport.queue_response(turn_response("resp_T1", "Resposta"));
        let (client, store) = client_with(Arc::clone(&transport));

        client.initialize("conv1").await.unwrap();
        let entry = store.get("conv1").await.unwrap();
        assert!(entry.initialized);
        assert_eq!(entry.continuation_token.as_deref(), Some("resp_T0"));

        let response = client
            .send(
                "conv1",
                "O que é autoconsciencialidade?",
                &SendOptions {
                    knowledge_base: Some("ECWV".to_string()),
                    top_k: Some(20),
                    ..SendOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(response.id, "resp_T1");

        let requests = transport.recorded_requests();
        let turn = &requests[1];
        assert_eq!(turn.previous_response_id.as_deref(), Some("resp_T0"));
        let tools = turn.tools.as_ref().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(
            tools[0].vector_store_ids,
            vec![knowledge_base::resolve("ECWV").to_string()]
        );
        assert_eq!(tools[0].max_num_results, 20);

        let status = client.status("conv1").await;
        assert_eq!(status.continuation_token.as_deref(), Some("resp_T1"));
        assert_ne!(status.continuation_token.as_deref(), Some("resp_T0"));
    }

    #[tokio::test]
    async fn test_send_applies_defaults() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(Arc::clone(&transport));
        client.initialize("c1").await.unwrap();

        client.send("c1", "Oi", &SendOptions::default()).await.unwrap();

        let turn = transport.recorded_requests().pop().unwrap();
        assert_eq!(turn.model, DEFAULT_MODEL);
        assert_eq!(turn.instructions, DEFAULT_INSTRUCTIONS);
        assert_eq!(turn.input, "Oi");
        let tools = turn.tools.unwrap();
        assert_eq!(
            tools[0].vector_store_ids,
            vec![knowledge_base::resolve(DEFAULT_KNOWLEDGE_BASE).to_string()]
        );
        assert_eq!(tools[0].max_num_results, DEFAULT_TOP_K);
    }

    #[tokio::test]
    async fn test_send_with_retrieval_disabled_and_pre_prompt() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(Arc::clone(&transport));
        client.initialize("c1").await.unwrap();

        client
            .send(
                "c1",
                "Oi",
                &SendOptions {
                    knowledge_base: Some("None".to_string()),
                    pre_prompt: Some("Contexto".to_string()),
                    ..SendOptions::default()
                },
            )
            .await
            .unwrap();

        let turn = transport.recorded_requests().pop().unwrap();
        assert!(turn.tools.is_none());
        assert_eq!(turn.input, "Contexto\n\nQuery do usuário: Oi");
    }

    #[tokio::test]
    async fn test_unknown_knowledge_base_falls_back() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(Arc::clone(&transport));
        client.initialize("c1").await.unwrap();

        client
            .send(
                "c1",
                "Oi",
                &SendOptions {
                    knowledge_base: Some("NOPE".to_string()),
                    ..SendOptions::default()
                },
            )
            .await
            .unwrap();

        let turn = transport.recorded_requests().pop().unwrap();
        assert_eq!(
            turn.tools.unwrap()[0].vector_store_ids,
            vec![knowledge_base::resolve("ALLWV").to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_send_keeps_previous_token() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(Arc::clone(&transport));
        let init = client.initialize("c1").await.unwrap();

        transport.queue_error(LlmError::rate_limit("slow down"));
        let err = client
            .send("c1", "Oi", &SendOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::ProviderCall(ref e) if e.kind == LlmErrorKind::RateLimit));

        let status = client.status("c1").await;
        assert_eq!(status.continuation_token, Some(init.continuation_token.clone()));

        // Retry chains onto the same predecessor
        client.send("c1", "Oi", &SendOptions::default()).await.unwrap();
        let retried = transport.recorded_requests().pop().unwrap();
        assert_eq!(retried.previous_response_id, Some(init.continuation_token));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(Arc::clone(&transport));
        client.initialize("c1").await.unwrap();

        let err = client
            .send("c1", "   ", &SendOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::EmptyMessage));
        assert_eq!(transport.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_then_status_and_reinitialize() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(Arc::clone(&transport));
        client.initialize("c1").await.unwrap();

        client.reset("c1").await;
        let status = client.status("c1").await;
        assert!(!status.exists);
        assert!(!status.initialized);
        assert!(status.continuation_token.is_none());

        // Idempotent
        client.reset("c1").await;
        client.reset("never-seen").await;

        let err = client
            .send("c1", "Oi", &SendOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::NotInitialized(_)));

        client.initialize("c1").await.unwrap();
        assert!(client.status("c1").await.initialized);
    }

    #[tokio::test]
    async fn test_status_of_unknown_conversation() {
        let (client, _) = client_with(Arc::new(MockTransport::new()));
        assert_eq!(
            client.status("nope").await,
            ConversationStatus {
                exists: false,
                initialized: false,
                continuation_token: None
            }
        );
    }

    #[tokio::test]
    async fn test_concurrent_sends_form_a_strict_chain() {
        let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(30)));
        let (client, _) = client_with(Arc::clone(&transport));
        let init = client.initialize("c1").await.unwrap();

        let options = SendOptions::default();
        let (a, b) = tokio::join!(
            client.send("c1", "m1", &options),
            client.send("c1", "m2", &options),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 3);
        let first = &requests[1];
        let second = &requests[2];

        // The first turn chains onto initialization, the second onto the first
        assert_eq!(first.previous_response_id, Some(init.continuation_token));
        let first_response = if first.input == "m1" { &a } else { &b };
        let second_response = if first.input == "m1" { &b } else { &a };
        assert_eq!(second.previous_response_id, Some(first_response.id.clone()));

        let status = client.status("c1").await;
        assert_eq!(status.continuation_token, Some(second_response.id.clone()));
    }

    #[tokio::test]
    async fn test_different_conversations_do_not_block_each_other() {
        let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(200)));
        let (client, _) = client_with(Arc::clone(&transport));

        let start = std::time::Instant::now();
        let (a, b) = tokio::join!(client.initialize("a"), client.initialize("b"));
        a.unwrap();
        b.unwrap();
        assert!(start.elapsed() < Duration::from_millis(380));
    }

    #[tokio::test]
    async fn test_timeout_is_distinct_and_keeps_token() {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(ConversationStore::new());
        let client = ConversationClient::new(
            Arc::clone(&transport) as Arc<dyn ResponsesTransport>,
            Arc::clone(&store),
            ClientDefaults {
                timeout: Duration::from_millis(50),
                ..ClientDefaults::default()
            },
        );
        client.initialize("c1").await.unwrap();
        let before = store.get("c1").await.unwrap();

        let slow = Arc::new(MockTransport::new().with_delay(Duration::from_millis(500)));
        let slow_client = ConversationClient::new(
            slow,
            Arc::clone(&store),
            ClientDefaults {
                timeout: Duration::from_millis(50),
                ..ClientDefaults::default()
            },
        );

        let err = slow_client
            .send("c1", "Oi", &SendOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::ProviderTimeout { .. }));
        assert_eq!(store.get("c1").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_transport_timeout_kind_maps_to_provider_timeout() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(Arc::clone(&transport));
        client.initialize("c1").await.unwrap();

        transport.queue_error(LlmError::timeout("read timed out"));
        let err = client
            .send("c1", "Oi", &SendOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::ProviderTimeout { .. }));
    }

    #[tokio::test]
    async fn test_abandoned_send_still_updates_token() {
        let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(100)));
        let (client, _) = client_with(Arc::clone(&transport));
        client.initialize("c1").await.unwrap();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            client.send("c1", "Oi", &SendOptions::default()),
        )
        .await;
        assert!(abandoned.is_err());

        // Next turn waits for the abandoned one and chains onto its response
        let next = client.send("c1", "De novo", &SendOptions::default()).await.unwrap();
        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].previous_response_id.as_deref(), Some("resp_2"));
        assert_eq!(transport.completed_calls(), 3);
        assert_eq!(client.status("c1").await.continuation_token, Some(next.id));
    }

    #[tokio::test]
    async fn test_rejected_sends_leave_no_turn_locks() {
        let transport = Arc::new(MockTransport::new());
        let (client, store) = client_with(Arc::clone(&transport));

        for i in 0..1000 {
            let err = client
                .send(&format!("ghost-{i}"), "Oi", &SendOptions::default())
                .await
                .unwrap_err();
            assert!(matches!(err, ConversationError::NotInitialized(_)));
        }

        assert_eq!(client.locks.len(), 0);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_finished_turns_leave_no_turn_locks() {
        let transport = Arc::new(MockTransport::new());
        let (client, _) = client_with(Arc::clone(&transport));

        client.initialize("c1").await.unwrap();
        client.initialize("c1").await.unwrap_err();
        client.send("c1", "Oi", &SendOptions::default()).await.unwrap();

        transport.queue_error(LlmError::server_error("boom"));
        client.initialize("c2").await.unwrap_err();
        transport.queue_error(LlmError::server_error("boom"));
        client.send("c1", "Oi", &SendOptions::default()).await.unwrap_err();

        assert_eq!(client.locks.len(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_turn_releases_its_lock() {
        let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(50)));
        let (client, _) = client_with(Arc::clone(&transport));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), client.initialize("c1")).await;
        assert!(abandoned.is_err());
        assert_eq!(client.locks.len(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(client.locks.len(), 0);
        assert!(client.status("c1").await.initialized);
    }
}
