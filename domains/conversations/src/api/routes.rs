//! Route definitions for the chat API

use axum::{routing::get, Router};

use super::handlers::{chat, conversations};
use super::middleware::ChatState;

/// Create all chat API routes
pub fn routes() -> Router<ChatState> {
    Router::new()
        .route(
            "/api/chat",
            get(conversations::list_conversations).post(chat::chat),
        )
        .route(
            "/api/chat/{id}",
            get(conversations::get_conversation)
                .patch(conversations::rename_conversation)
                .delete(conversations::delete_conversation),
        )
        .route("/api/chat/{id}/messages", get(conversations::list_messages))
}
