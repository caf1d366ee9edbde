//! Conversation management API handlers

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use threadline_auth::CurrentUser;
use threadline_common::{ApiResponse, Error, PageQuery, Result, ValidatedJson};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::ChatState;
use crate::domain::entities::{Conversation, Message};

/// Request for renaming a conversation
#[derive(Debug, Deserialize, Validate)]
pub struct RenameConversationRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
}

/// List the authenticated user's conversations, newest first
pub async fn list_conversations(
    CurrentUser(ctx): CurrentUser,
    State(state): State<ChatState>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<Vec<Conversation>>> {
    let params = query.resolve()?;
    let (conversations, total_items) = state.store.page_for_owner(ctx.user.id, params).await?;

    Ok(ApiResponse::paginated(
        conversations,
        "Conversations fetched successfully!",
        params.meta(total_items),
    ))
}

/// Get a single conversation by id
pub async fn get_conversation(
    CurrentUser(ctx): CurrentUser,
    State(state): State<ChatState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Conversation>> {
    let conversation = state
        .store
        .find_for_owner(id, ctx.user.id)
        .await?
        .ok_or_else(|| Error::NotFound("Conversation not found!".to_string()))?;

    Ok(ApiResponse::new(
        conversation,
        "Conversation fetched successfully!",
    ))
}

/// Rename a conversation
pub async fn rename_conversation(
    CurrentUser(ctx): CurrentUser,
    State(state): State<ChatState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RenameConversationRequest>,
) -> Result<ApiResponse<Conversation>> {
    let conversation = state
        .store
        .rename(id, ctx.user.id, &req.title)
        .await?
        .ok_or_else(|| Error::NotFound("Conversation not found!".to_string()))?;

    Ok(ApiResponse::new(conversation, "Conversation title updated!"))
}

/// Delete a conversation, returning the deleted row
pub async fn delete_conversation(
    CurrentUser(ctx): CurrentUser,
    State(state): State<ChatState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Conversation>> {
    let conversation = state
        .store
        .delete(id, ctx.user.id)
        .await?
        .ok_or_else(|| Error::NotFound("Conversation not found!".to_string()))?;

    Ok(ApiResponse::new(conversation, "Conversation deleted!"))
}

/// List a conversation's messages in insertion order
pub async fn list_messages(
    CurrentUser(ctx): CurrentUser,
    State(state): State<ChatState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Vec<Message>>> {
    // Ownership gate before any message is exposed
    state
        .store
        .find_for_owner(id, ctx.user.id)
        .await?
        .ok_or_else(|| Error::NotFound("Conversation not found!".to_string()))?;

    let messages = state.store.messages(id).await?;

    Ok(ApiResponse::new(messages, "Messages fetched successfully!"))
}
