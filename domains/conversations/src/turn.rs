//! Chat turn orchestration
//!
//! The streaming core of the service. One call resolves or creates the
//! conversation, opens the model stream, relays tokens to the caller as
//! they are produced, and persists the turn's two messages once the
//! full assistant text is known. Token delivery never waits on the
//! database write, and a client that goes away does not stop the turn
//! from being recorded.

use std::sync::Arc;

use axum::body::Bytes;
use futures::StreamExt;
use threadline_common::{Error, Result};
use threadline_llm::{
    CompletionRequest, CompletionStream, LlmError, LlmMessage, LlmRole, LlmService,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message, MessageRole, TurnMessage};
use crate::repository::ConversationStore;
use crate::title;

/// Bound on in-flight token chunks between producer and client
const TOKEN_CHANNEL_CAPACITY: usize = 16;

/// Runs chat turns end-to-end
#[derive(Clone)]
pub struct TurnRunner {
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LlmService>,
    model: String,
}

/// A chat turn in flight.
///
/// `tokens` yields the assistant's output as it is produced; the
/// channel closes when the model finishes or fails. `worker` completes
/// once the persistence step has run. The HTTP layer drops the handle;
/// tests await it before asserting on stored messages.
pub struct ChatTurn {
    pub conversation: Conversation,
    pub created: bool,
    pub tokens: mpsc::Receiver<std::result::Result<Bytes, LlmError>>,
    pub worker: JoinHandle<()>,
}

impl TurnRunner {
    pub fn new(store: Arc<dyn ConversationStore>, llm: Arc<dyn LlmService>, model: String) -> Self {
        Self { store, llm, model }
    }

    /// Validate the turn, resolve its conversation, and open the model
    /// stream. Returns as soon as the stream is open; relay and
    /// persistence continue on a background task.
    ///
    /// The most recent `user` entry of `messages` is the current turn
    /// message. It drives title generation for new conversations and is
    /// the user half of the persisted pair.
    pub async fn begin(
        &self,
        owner_id: Uuid,
        conversation_id: Option<Uuid>,
        messages: Vec<TurnMessage>,
    ) -> Result<ChatTurn> {
        let current = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .cloned()
            .ok_or_else(|| Error::Validation("User message not found!".to_string()))?;

        let (conversation, created) = match conversation_id {
            Some(id) => {
                let conversation = self
                    .store
                    .find_for_owner(id, owner_id)
                    .await?
                    .ok_or_else(|| Error::NotFound("Conversation not found!".to_string()))?;
                (conversation, false)
            }
            None => {
                let generated =
                    title::generate_title(self.llm.as_ref(), &self.model, &current).await?;
                let conversation = self
                    .store
                    .create(&Conversation::new(owner_id, generated)?)
                    .await?;
                tracing::info!(conversation_id = %conversation.id, "Created conversation");
                (conversation, true)
            }
        };

        let request = CompletionRequest {
            model: self.model.clone(),
            system_prompt: None,
            messages: messages
                .iter()
                .map(|m| LlmMessage {
                    role: match m.role {
                        MessageRole::User => LlmRole::User,
                        MessageRole::Assistant => LlmRole::Assistant,
                    },
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: None,
        };

        let stream = self
            .llm
            .stream(request)
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let (tx, rx) = mpsc::channel(TOKEN_CHANNEL_CAPACITY);
        let worker = tokio::spawn(relay_and_persist(
            stream,
            tx,
            Arc::clone(&self.store),
            conversation.id,
            current.content,
        ));

        Ok(ChatTurn {
            conversation,
            created,
            tokens: rx,
            worker,
        })
    }
}

/// Forward the model stream chunk by chunk, then write the turn.
///
/// A mid-stream provider error truncates the client stream and skips
/// persistence entirely. A dropped receiver only stops forwarding: the
/// provider stream is still drained to completion and the turn is
/// persisted, since the store is the system of record.
async fn relay_and_persist(
    mut stream: CompletionStream,
    tx: mpsc::Sender<std::result::Result<Bytes, LlmError>>,
    store: Arc<dyn ConversationStore>,
    conversation_id: Uuid,
    user_content: String,
) {
    let mut transcript = String::new();
    let mut client_gone = false;

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                let delta = chunk.delta;
                transcript.push_str(&delta);
                if !client_gone && !delta.is_empty() {
                    if tx.send(Ok(Bytes::from(delta))).await.is_err() {
                        client_gone = true;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "Model stream failed mid-response"
                );
                if !client_gone {
                    let _ = tx.send(Err(e)).await;
                }
                return;
            }
        }
    }

    // Close the client's stream before touching the store: persistence
    // must not gate token delivery.
    drop(tx);

    let (user, assistant) = Message::turn_pair(conversation_id, user_content, transcript);

    if let Err(e) = store.append_turn(&user, &assistant).await {
        tracing::error!(
            conversation_id = %conversation_id,
            error = %e,
            "Failed to persist chat turn"
        );
    }
}
