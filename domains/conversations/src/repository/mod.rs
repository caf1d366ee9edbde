//! Repository layer for the Conversations domain
//!
//! The store is consumed through the `ConversationStore` trait so the
//! turn orchestrator and handlers stay independent of the backing
//! database. `PgConversationStore` is the production implementation;
//! `MemoryConversationStore` backs tests.

pub mod memory;
pub mod postgres;

pub use memory::MemoryConversationStore;
pub use postgres::PgConversationStore;

use async_trait::async_trait;
use threadline_common::{PageParams, Result};
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message};

/// Storage boundary for conversations and their messages.
///
/// Every conversation accessor is owner-scoped: a conversation that
/// exists but belongs to someone else behaves exactly like one that
/// does not exist.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert a new conversation and return the stored row
    async fn create(&self, conversation: &Conversation) -> Result<Conversation>;

    /// Find a conversation by id, scoped to its owner
    async fn find_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Conversation>>;

    /// One page of an owner's conversations, newest first, plus the
    /// owner's total conversation count.
    async fn page_for_owner(
        &self,
        owner_id: Uuid,
        params: PageParams,
    ) -> Result<(Vec<Conversation>, i64)>;

    /// Set a conversation's title; `None` when absent or not owned
    async fn rename(&self, id: Uuid, owner_id: Uuid, title: &str) -> Result<Option<Conversation>>;

    /// Delete a conversation and return the deleted row; `None` when
    /// absent or not owned. Messages go with it.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Conversation>>;

    /// All messages of a conversation in insertion order
    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>>;

    /// Persist one completed turn: the user message and the assistant
    /// message, atomically and in that order.
    async fn append_turn(&self, user: &Message, assistant: &Message) -> Result<()>;
}
