//! ConsAI - conscientiology research assistant backend
//!
//! Serves the module catalog, per-module settings and a retrieval-augmented
//! conversation client on top of the OpenAI responses endpoint.

mod api;
mod config;
mod conversation;
mod db;
mod llm;
mod modules;

use api::{create_router, AppState};
use config::AppConfig;
use conversation::{ClientDefaults, ConversationClient, ConversationStore};
use db::Database;
use llm::{LoggingTransport, OpenAIService};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consai=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration; a missing credential stops here
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    tracing::info!(config = ?config, "Configuration loaded");

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    // Provider clients
    let openai = Arc::new(OpenAIService::new(
        config.api_key.clone(),
        &config.base_url,
        config.request_timeout,
    )?);
    let transport = Arc::new(LoggingTransport::new(Arc::clone(&openai)));
    let llm = Arc::new(LoggingTransport::new(openai));

    let conversations = ConversationClient::new(
        transport,
        Arc::new(ConversationStore::new()),
        ClientDefaults::from_config(&config),
    );
    tracing::info!(
        model = %conversations.defaults().model,
        knowledge_base = %conversations.defaults().knowledge_base,
        "Conversation client ready"
    );

    let state = AppState::new(conversations, db, llm, config.request_timeout);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(CompressionLayer::new()),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("ConsAI server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
