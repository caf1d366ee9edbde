//! Postgres-backed conversation store

use async_trait::async_trait;
use sqlx::PgPool;
use threadline_common::{PageParams, Result};
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message};
use crate::repository::ConversationStore;

#[derive(Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn create(&self, conversation: &Conversation) -> Result<Conversation> {
        let created = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (id, owner_id, title, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, title, created_at
            "#,
        )
        .bind(conversation.id)
        .bind(conversation.owner_id)
        .bind(&conversation.title)
        .bind(conversation.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_for_owner(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, owner_id, title, created_at
            FROM conversations
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn page_for_owner(
        &self,
        owner_id: Uuid,
        params: PageParams,
    ) -> Result<(Vec<Conversation>, i64)> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM conversations WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool);

        let items = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, owner_id, title, created_at
            FROM conversations
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(&self.pool);

        // Count and page run concurrently on separate pool connections
        let (total, items) = tokio::join!(total, items);

        Ok((items?, total?))
    }

    async fn rename(&self, id: Uuid, owner_id: Uuid, title: &str) -> Result<Option<Conversation>> {
        let updated = sqlx::query_as::<_, Conversation>(
            r#"
            UPDATE conversations SET title = $3
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Conversation>> {
        // Messages are removed by the ON DELETE CASCADE on messages.conversation_id
        let deleted = sqlx::query_as::<_, Conversation>(
            r#"
            DELETE FROM conversations
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }

    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        // message_role declares user before assistant, so role breaks
        // creation-time ties inside a turn
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, role ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn append_turn(&self, user: &Message, assistant: &Message) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for message in [user, assistant] {
            sqlx::query(
                r#"
                INSERT INTO messages (id, conversation_id, role, content, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(message.id)
            .bind(message.conversation_id)
            .bind(message.role)
            .bind(&message.content)
            .bind(message.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
