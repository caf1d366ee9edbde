//! Threadline LLM Service
//!
//! Provides chat-completion functionality with support for:
//! - Groq's OpenAI-compatible API for production completions
//! - Incremental token streaming (SSE) for the chat endpoint
//! - Mock service for testing and development

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use thiserror::Error;

pub mod groq;
pub mod mock;
mod sse;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM response error: {0}")]
    Response(String),

    #[error("LLM stream error: {0}")]
    Stream(String),

    #[error("LLM rate limit exceeded")]
    RateLimit,
}

/// Message role as the provider sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmRole {
    User,
    Assistant,
}

/// One message of the completion context
#[derive(Debug, Clone)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

/// Request for a completion, streamed or not
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier; empty string means the service default
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
}

/// Full (non-streaming) completion result
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

/// One incremental piece of a streamed completion
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    pub delta: String,
    pub finish_reason: Option<String>,
}

/// Streamed completion: tokens as the provider emits them
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, LlmError>> + Send>>;

/// LLM service configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider selection (groq, mock)
    pub provider: String,
    pub api_key: String,
    pub default_model: String,
    /// Completion ceiling applied when a request doesn't set one
    pub max_tokens: Option<u32>,
    /// Override the provider endpoint (mainly for tests)
    pub base_url: Option<String>,
}

/// LLM service trait for different implementations
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Run a completion to the end and return the full text
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Open a completion stream; fails before the first token if the
    /// provider rejects the request outright.
    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream, LlmError>;

    /// Model used when a request leaves `model` empty
    fn default_model(&self) -> &str;
}

/// LLM service factory
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create an LLM service based on configuration
    pub fn create(config: LlmConfig) -> Result<Arc<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "groq" => {
                tracing::info!(model = %config.default_model, "Creating Groq LLM service");
                Ok(Arc::new(groq::GroqService::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock LLM service");
                Ok(Arc::new(mock::MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: groq, mock",
                provider
            ))),
        }
    }
}
