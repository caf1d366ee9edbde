//! Domain entities for the Conversations domain
//!
//! A conversation is a titled, owned container for an ordered sequence
//! of messages. Messages are created in pairs per turn (one `user`, one
//! `assistant`) and are immutable once persisted. All entities serialize
//! with camelCase keys, matching the wire format of the API.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use threadline_common::{Error, Result};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation owned by `owner_id`
    pub fn new(owner_id: Uuid, title: String) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }

        Ok(Conversation {
            id: Uuid::new_v4(),
            owner_id,
            title,
            created_at: Utc::now(),
        })
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message for a conversation
    pub fn user(conversation_id: Uuid, content: String) -> Self {
        Self::with_role(conversation_id, MessageRole::User, content)
    }

    /// Create an assistant message for a conversation
    pub fn assistant(conversation_id: Uuid, content: String) -> Self {
        Self::with_role(conversation_id, MessageRole::Assistant, content)
    }

    /// Create the two message rows of one completed turn.
    ///
    /// Back-to-back clock reads can land in the same microsecond, the
    /// resolution timestamps are stored at. The assistant row is placed
    /// strictly after the user row so the pair keeps its creation order
    /// under a timestamp-ordered read.
    pub fn turn_pair(
        conversation_id: Uuid,
        user_content: String,
        assistant_content: String,
    ) -> (Self, Self) {
        let user = Message::user(conversation_id, user_content);
        let mut assistant = Message::assistant(conversation_id, assistant_content);
        let floor = user.created_at + Duration::microseconds(1);
        if assistant.created_at < floor {
            assistant.created_at = floor;
        }
        (user, assistant)
    }

    fn with_role(conversation_id: Uuid, role: MessageRole, content: String) -> Self {
        Message {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            content,
            created_at: Utc::now(),
        }
    }
}

/// One entry of an incoming turn's message history.
///
/// This is the client-supplied shape: the full prior exchange plus the
/// current user message, before any of it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnMessage {
    pub role: MessageRole,
    pub content: String,
}

impl TurnMessage {
    pub fn user(content: impl Into<String>) -> Self {
        TurnMessage {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        TurnMessage {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}
