//! Threadline application composition root
//!
//! Composes the conversations router with shared infrastructure routes.

use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use threadline_auth::SessionBackend;
use threadline_common::{Config, Error};
use threadline_conversations::{ChatState, PgConversationStore};
use threadline_llm::{LlmConfig, LlmServiceFactory};

/// Create the main application router backed by Postgres
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    sqlx::migrate!("../../migrations").run(&pool).await?;

    // Create repositories
    let store = Arc::new(PgConversationStore::new(pool.clone()));

    // Session-token auth against the same database
    let auth = SessionBackend::postgres(pool);

    // Create the LLM service from configuration
    let llm = LlmServiceFactory::create(LlmConfig {
        provider: config.llm_provider.clone(),
        api_key: config.groq_api_key.clone(),
        default_model: config.chat_model.clone(),
        max_tokens: None,
        base_url: Some(config.groq_base_url.clone()),
    })?;

    let state = ChatState::new(store, auth, llm, config.chat_model);

    Ok(router_with_state(state))
}

/// Build the router for an already assembled domain state.
///
/// Split out from [`create_app`] so tests can wire in-memory stores.
pub fn router_with_state(state: ChatState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Threadline AI Chat API!" }))
        .merge(threadline_conversations::routes().with_state(state))
        .fallback(endpoint_not_found)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Catch-all for unknown routes, kept in the same envelope as API errors
async fn endpoint_not_found() -> Error {
    Error::NotFound("Requested endpoint not found!".to_string())
}
