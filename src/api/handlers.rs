//! HTTP request handlers

use super::types::{
    AskRequest, AskResponse, CreateConversationResponse, ErrorResponse, InfoResponse,
    KnowledgeBasesResponse, MessageResponse, ModulesResponse, SendMessageRequest,
    SettingsResponse, SuccessResponse,
};
use super::AppState;
use crate::conversation::{
    ConversationError, ConversationStatus, InitializeResult, SendOptions, DEFAULT_KNOWLEDGE_BASE,
    RETRIEVAL_DISABLED,
};
use crate::db::DbError;
use crate::modules::{
    self, AssistantError, ModuleInfo, ModuleSettings, SettingsError, RAG_MODULE_ID,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Module catalog and settings
        .route("/api/modules", get(list_modules))
        .route(
            "/api/modules/:id/settings",
            get(get_settings).put(update_settings).delete(reset_settings),
        )
        .route("/api/modules/:id/ask", post(ask_module))
        .route("/api/knowledge-bases", get(list_knowledge_bases))
        // Conversation lifecycle
        .route("/api/conversations", post(create_conversation))
        .route("/api/conversations/:id", get(conversation_status))
        .route(
            "/api/conversations/:id/initialize",
            post(initialize_conversation),
        )
        .route("/api/conversations/:id/messages", post(send_message))
        .route("/api/conversations/:id/reset", post(reset_conversation))
        .route("/api/info", get(get_info))
        .with_state(state)
}

// ============================================================
// Modules
// ============================================================

async fn list_modules() -> Json<ModulesResponse> {
    Json(ModulesResponse {
        modules: modules::all_modules(),
    })
}

fn find_module(id: &str) -> Result<&'static ModuleInfo, AppError> {
    modules::get_module(id).ok_or_else(|| AppError::NotFound(format!("Unknown module: {id}")))
}

/// Model configured at startup; module defaults start from it
fn default_model(state: &AppState) -> &str {
    &state.conversations.defaults().model
}

async fn get_settings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SettingsResponse>, AppError> {
    let module = find_module(&id)?;

    let response = match state.db.get_settings(module.id, default_model(&state))? {
        Some(stored) => SettingsResponse {
            module_id: stored.module_id,
            settings: stored.settings,
            customized: true,
            updated_at: Some(stored.updated_at),
        },
        None => SettingsResponse {
            module_id: module.id.to_string(),
            settings: ModuleSettings::defaults_for(module.id, default_model(&state)),
            customized: false,
            updated_at: None,
        },
    };
    Ok(Json(response))
}

async fn update_settings(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<Json<SettingsResponse>, AppError> {
    let module = find_module(&id)?;
    let defaults = ModuleSettings::defaults_for(module.id, default_model(&state));
    let settings = ModuleSettings::merge_over(defaults, fields)
        .map_err(|e| AppError::BadRequest("invalid_settings", e.to_string()))?;
    settings.validate()?;

    let stored = state.db.save_settings(module.id, &settings)?;
    tracing::info!(module = module.id, "Module settings saved");

    Ok(Json(SettingsResponse {
        module_id: stored.module_id,
        settings: stored.settings,
        customized: true,
        updated_at: Some(stored.updated_at),
    }))
}

/// Forget stored settings so the module returns to its defaults
async fn reset_settings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SettingsResponse>, AppError> {
    let module = find_module(&id)?;
    if state.db.delete_settings(module.id)? {
        tracing::info!(module = module.id, "Module settings reset");
    }

    Ok(Json(SettingsResponse {
        module_id: module.id.to_string(),
        settings: ModuleSettings::defaults_for(module.id, default_model(&state)),
        customized: false,
        updated_at: None,
    }))
}

async fn ask_module(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let module = find_module(&id)?;
    let settings = state
        .db
        .effective_settings(module.id, default_model(&state))?;

    let response = modules::ask(
        state.llm.as_ref(),
        module,
        &settings,
        &req.question,
        state.request_timeout,
    )
    .await?;

    Ok(Json(AskResponse {
        text: response.text,
        model: response.model,
        usage: response.usage,
    }))
}

async fn list_knowledge_bases(State(state): State<AppState>) -> Json<KnowledgeBasesResponse> {
    Json(KnowledgeBasesResponse {
        knowledge_bases: state.conversations.knowledge_bases(),
        default: DEFAULT_KNOWLEDGE_BASE,
        disabled: RETRIEVAL_DISABLED,
    })
}

// ============================================================
// Conversations
// ============================================================

async fn create_conversation() -> Json<CreateConversationResponse> {
    Json(CreateConversationResponse {
        conversation_id: uuid::Uuid::new_v4().to_string(),
    })
}

async fn initialize_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InitializeResult>, AppError> {
    let result = state.conversations.initialize(&id).await?;
    Ok(Json(result))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let settings = state
        .db
        .effective_settings(RAG_MODULE_ID, default_model(&state))?;
    let options = fill_from_settings(req.options, settings);

    let response = state
        .conversations
        .send(&id, &req.message, &options)
        .await?;

    Ok(Json(MessageResponse {
        text: response.text,
        model: response.model,
        continuation_token: response.id,
        sources: response.sources,
        usage: response.usage,
    }))
}

/// RAG settings, saved or default, fill whatever the request leaves unset
fn fill_from_settings(options: SendOptions, settings: ModuleSettings) -> SendOptions {
    let instructions = settings.instructions().map(str::to_string);
    SendOptions {
        model: options.model.or(Some(settings.model)),
        temperature: options.temperature.or(Some(settings.temperature)),
        instructions: options.instructions.or(instructions),
        pre_prompt: options.pre_prompt,
        knowledge_base: options.knowledge_base.or(Some(settings.knowledge_base)),
        top_k: options.top_k.or(Some(settings.top_k)),
        max_output_tokens: options.max_output_tokens.or(Some(settings.max_tokens)),
    }
}

async fn reset_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<SuccessResponse> {
    state.conversations.reset(&id).await;
    Json(SuccessResponse { success: true })
}

async fn conversation_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ConversationStatus> {
    Json(state.conversations.status(&id).await)
}

// ============================================================
// Info
// ============================================================

async fn get_info(State(state): State<AppState>) -> Json<InfoResponse> {
    let defaults = state.conversations.defaults();
    Json(InfoResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        default_model: defaults.model.clone(),
        default_temperature: defaults.temperature,
        default_top_k: defaults.top_k,
        has_api_key: state.has_api_key,
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(&'static str, String),
    NotFound(String),
    Conflict(&'static str, String),
    BadGateway(&'static str, String),
    GatewayTimeout(String),
    Internal(&'static str, String),
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        let kind = e.kind();
        match e {
            ConversationError::AlreadyInitialized(_) | ConversationError::NotInitialized(_) => {
                AppError::Conflict(kind, e.to_string())
            }
            ConversationError::EmptyMessage => AppError::BadRequest(kind, e.to_string()),
            ConversationError::ProviderCall(_) => AppError::BadGateway(kind, e.to_string()),
            ConversationError::ProviderTimeout { .. } => AppError::GatewayTimeout(e.to_string()),
            ConversationError::TaskAborted(_) => AppError::Internal(kind, e.to_string()),
        }
    }
}

impl From<AssistantError> for AppError {
    fn from(e: AssistantError) -> Self {
        match e {
            AssistantError::EmptyQuestion => AppError::BadRequest("empty_question", e.to_string()),
            AssistantError::NotAskable(_) => AppError::BadRequest("not_askable", e.to_string()),
            AssistantError::Provider(_) => AppError::BadGateway("provider_call", e.to_string()),
            AssistantError::Timeout { .. } => AppError::GatewayTimeout(e.to_string()),
        }
    }
}

impl From<SettingsError> for AppError {
    fn from(e: SettingsError) -> Self {
        AppError::BadRequest("invalid_settings", e.to_string())
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        tracing::error!(error = %e, "Database error");
        AppError::Internal("database", e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::BadRequest(kind, msg) => (StatusCode::BAD_REQUEST, kind, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::Conflict(kind, msg) => (StatusCode::CONFLICT, kind, msg),
            AppError::BadGateway(kind, msg) => (StatusCode::BAD_GATEWAY, kind, msg),
            AppError::GatewayTimeout(msg) => {
                (StatusCode::GATEWAY_TIMEOUT, "provider_timeout", msg)
            }
            AppError::Internal(kind, msg) => (StatusCode::INTERNAL_SERVER_ERROR, kind, msg),
        };

        let body = Json(ErrorResponse::new(message, kind));
        (status, body).into_response()
    }
}
