//! Groq API Implementation
//!
//! Calls Groq's OpenAI-compatible chat completions API
//! (https://api.groq.com/openai/v1/chat/completions) using reqwest,
//! with optional SSE streaming.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    sse, CompletionRequest, CompletionResponse, CompletionStream, LlmConfig, LlmError, LlmService,
};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Chat completions request body
#[derive(Debug, Serialize)]
struct ChatRequestBody {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    choices: Vec<ChatChoice>,
    model: String,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: i32,
    completion_tokens: i32,
}

/// Groq API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Groq LLM service implementation
pub struct GroqService {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

impl GroqService {
    /// Create a new Groq service
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }

    fn request_body(&self, request: CompletionRequest, stream: bool) -> ChatRequestBody {
        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = request.system_prompt {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system,
            });
        }

        for m in &request.messages {
            messages.push(WireMessage {
                role: match m.role {
                    crate::LlmRole::User => "user".to_string(),
                    crate::LlmRole::Assistant => "assistant".to_string(),
                },
                content: m.content.clone(),
            });
        }

        ChatRequestBody {
            model,
            messages,
            stream,
            max_tokens: request.max_tokens.or(self.config.max_tokens),
        }
    }

    async fn send_chat(&self, body: &ChatRequestBody) -> Result<reqwest::Response, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = %body.model, stream = body.stream, "Sending Groq chat completion request");

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.config.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            // Try to parse as API error
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(LlmError::Response(format!(
                    "Groq API error ({}): {}",
                    error_response.error.error_type, error_response.error.message
                )));
            }

            return Err(LlmError::Response(format!(
                "Groq API returned {}: {}",
                status, error_body
            )));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl LlmService for GroqService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.request_body(request, false);
        let response = self.send_chat(&body).await?;

        let api_response: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Response("Response contained no choices".to_string()))?;

        Ok(CompletionResponse {
            content: choice.message.content,
            model: api_response.model,
            input_tokens: api_response.usage.prompt_tokens,
            output_tokens: api_response.usage.completion_tokens,
            stop_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream, LlmError> {
        let body = self.request_body(request, true);
        let response = self.send_chat(&body).await?;

        Ok(sse::decode_token_stream(response))
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
