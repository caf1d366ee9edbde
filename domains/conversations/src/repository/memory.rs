//! In-memory conversation store
//!
//! Mirrors the Postgres store's semantics (owner scoping, newest-first
//! paging, cascade delete) over plain vectors. Used by orchestrator and
//! API tests that should not need a live database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use threadline_common::{PageParams, Result};
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message};
use crate::repository::ConversationStore;

#[derive(Default)]
struct Inner {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
}

#[derive(Clone, Default)]
pub struct MemoryConversationStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored conversations, across all owners
    pub fn conversation_count(&self) -> usize {
        self.lock().conversations.len()
    }

    /// Total number of stored messages, across all conversations
    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .expect("store lock poisoned - a previous test panicked")
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create(&self, conversation: &Conversation) -> Result<Conversation> {
        self.lock().conversations.push(conversation.clone());
        Ok(conversation.clone())
    }

    async fn find_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Conversation>> {
        Ok(self
            .lock()
            .conversations
            .iter()
            .find(|c| c.id == id && c.owner_id == owner_id)
            .cloned())
    }

    async fn page_for_owner(
        &self,
        owner_id: Uuid,
        params: PageParams,
    ) -> Result<(Vec<Conversation>, i64)> {
        let mut owned: Vec<Conversation> = self
            .lock()
            .conversations
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();

        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = owned.len() as i64;
        let page = owned
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn rename(&self, id: Uuid, owner_id: Uuid, title: &str) -> Result<Option<Conversation>> {
        let mut inner = self.lock();
        let conversation = inner
            .conversations
            .iter_mut()
            .find(|c| c.id == id && c.owner_id == owner_id);

        Ok(conversation.map(|c| {
            c.title = title.to_string();
            c.clone()
        }))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Conversation>> {
        let mut inner = self.lock();
        let position = inner
            .conversations
            .iter()
            .position(|c| c.id == id && c.owner_id == owner_id);

        Ok(position.map(|pos| {
            let removed = inner.conversations.remove(pos);
            inner.messages.retain(|m| m.conversation_id != removed.id);
            removed
        }))
    }

    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn append_turn(&self, user: &Message, assistant: &Message) -> Result<()> {
        let mut inner = self.lock();
        inner.messages.push(user.clone());
        inner.messages.push(assistant.clone());
        Ok(())
    }
}
