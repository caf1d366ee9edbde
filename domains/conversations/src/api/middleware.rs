//! Chat domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;
use threadline_auth::SessionBackend;
use threadline_llm::LlmService;

use crate::repository::ConversationStore;
use crate::turn::TurnRunner;

/// Application state for the chat API
#[derive(Clone)]
pub struct ChatState {
    pub store: Arc<dyn ConversationStore>,
    pub auth: SessionBackend,
    pub turns: TurnRunner,
}

impl ChatState {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        auth: SessionBackend,
        llm: Arc<dyn LlmService>,
        chat_model: String,
    ) -> Self {
        Self {
            turns: TurnRunner::new(store.clone(), llm, chat_model),
            store,
            auth,
        }
    }
}

impl FromRef<ChatState> for SessionBackend {
    fn from_ref(state: &ChatState) -> Self {
        state.auth.clone()
    }
}
