//! Mock LLM Service
//!
//! Deterministic implementation for testing: echoes the last user
//! message, records every request it receives, and can be configured
//! to fail at specific points of the request lifecycle.

use std::sync::{Arc, Mutex};

use crate::{
    CompletionRequest, CompletionResponse, CompletionStream, LlmError, LlmService, StreamChunk,
};

#[derive(Debug, Clone, Copy)]
enum Failure {
    Completion,
    StreamOpen,
    StreamAfter(usize),
}

/// Mock LLM service for testing
#[derive(Clone, Default)]
pub struct MockLlmService {
    completions: Arc<Mutex<Vec<CompletionRequest>>>,
    streams: Arc<Mutex<Vec<CompletionRequest>>>,
    failure: Option<Failure>,
}

impl MockLlmService {
    /// Create a new mock service
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock whose `complete` calls always fail
    pub fn failing_completion() -> Self {
        Self {
            failure: Some(Failure::Completion),
            ..Self::default()
        }
    }

    /// Mock whose `stream` calls fail before yielding any token
    pub fn failing_stream() -> Self {
        Self {
            failure: Some(Failure::StreamOpen),
            ..Self::default()
        }
    }

    /// Mock whose streams yield `chunks` tokens and then error out
    pub fn failing_stream_after(chunks: usize) -> Self {
        Self {
            failure: Some(Failure::StreamAfter(chunks)),
            ..Self::default()
        }
    }

    /// All requests seen by `complete`, in order
    pub fn recorded_completions(&self) -> Vec<CompletionRequest> {
        self.completions
            .lock()
            .expect("completions lock poisoned - a previous test panicked")
            .clone()
    }

    /// All requests seen by `stream`, in order
    pub fn recorded_streams(&self) -> Vec<CompletionRequest> {
        self.streams
            .lock()
            .expect("streams lock poisoned - a previous test panicked")
            .clone()
    }

    /// Clear all recorded requests
    pub fn reset(&self) {
        self.completions
            .lock()
            .expect("completions lock poisoned - a previous test panicked")
            .clear();
        self.streams
            .lock()
            .expect("streams lock poisoned - a previous test panicked")
            .clear();
    }

    fn response_text(request: &CompletionRequest) -> String {
        let last = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or("");
        format!("Mock response to: {}", last)
    }

    fn model_for(request: &CompletionRequest) -> String {
        if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model.clone()
        }
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.completions
            .lock()
            .expect("completions lock poisoned - a previous test panicked")
            .push(request.clone());

        if matches!(self.failure, Some(Failure::Completion)) {
            return Err(LlmError::Response("Mock completion failure".to_string()));
        }

        let content = Self::response_text(&request);

        Ok(CompletionResponse {
            content: content.clone(),
            model: Self::model_for(&request),
            input_tokens: (request
                .messages
                .iter()
                .map(|m| m.content.len())
                .sum::<usize>()
                / 4) as i32,
            output_tokens: (content.len() / 4) as i32,
            stop_reason: "stop".to_string(),
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream, LlmError> {
        self.streams
            .lock()
            .expect("streams lock poisoned - a previous test panicked")
            .push(request.clone());

        if matches!(self.failure, Some(Failure::StreamOpen)) {
            return Err(LlmError::Request("Mock stream refused".to_string()));
        }

        let content = Self::response_text(&request);

        let mut chunks: Vec<Result<StreamChunk, LlmError>> = content
            .split_inclusive(' ')
            .map(|piece| {
                Ok(StreamChunk {
                    delta: piece.to_string(),
                    finish_reason: None,
                })
            })
            .collect();

        if let Some(Failure::StreamAfter(n)) = self.failure {
            chunks.truncate(n);
            chunks.push(Err(LlmError::Stream("Mock stream interrupted".to_string())));
        } else {
            // Groq sends the finish reason as a trailing empty delta
            chunks.push(Ok(StreamChunk {
                delta: String::new(),
                finish_reason: Some("stop".to_string()),
            }));
        }

        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
