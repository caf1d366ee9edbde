//! Conversations domain: chat threads, streamed turns, messages

pub mod api;
pub mod domain;
pub mod repository;
pub mod title;
pub mod turn;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Conversation, Message, MessageRole, TurnMessage};

// Re-export repository types
pub use repository::{ConversationStore, MemoryConversationStore, PgConversationStore};

// Re-export API types
pub use api::routes;
pub use api::ChatState;

// Re-export orchestration types
pub use turn::{ChatTurn, TurnRunner};
