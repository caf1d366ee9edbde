//! Streaming chat handler

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use threadline_auth::CurrentUser;
use threadline_common::{Result, ValidatedJson};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::ChatState;
use crate::domain::entities::TurnMessage;

/// Response header carrying the resolved conversation id
pub const CONVERSATION_ID_HEADER: &str = "x-conversation-id";

/// Response header carrying a newly generated conversation title
pub const CONVERSATION_TITLE_HEADER: &str = "x-conversation-title";

/// Request for one chat turn
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Continue this conversation; omit to start a new one
    pub conversation_id: Option<Uuid>,

    /// Full message history including the current user message
    #[validate(length(min = 1, message = "Messages are required!"))]
    pub messages: Vec<TurnMessage>,
}

/// Run one chat turn, streaming the assistant's reply as plain text.
///
/// The body is a raw token stream, so the conversation id (and, for new
/// conversations, the generated title) travel in response headers.
pub async fn chat(
    CurrentUser(ctx): CurrentUser,
    State(state): State<ChatState>,
    ValidatedJson(req): ValidatedJson<ChatRequest>,
) -> Result<Response> {
    let turn = state
        .turns
        .begin(ctx.user.id, req.conversation_id, req.messages)
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    if let Ok(value) = HeaderValue::from_str(&turn.conversation.id.to_string()) {
        headers.insert(CONVERSATION_ID_HEADER, value);
    }
    if turn.created {
        match HeaderValue::from_str(&turn.conversation.title) {
            Ok(value) => {
                headers.insert(CONVERSATION_TITLE_HEADER, value);
            }
            Err(_) => tracing::warn!(
                conversation_id = %turn.conversation.id,
                "Conversation title is not header-safe, omitting it"
            ),
        }
    }

    let body = Body::from_stream(ReceiverStream::new(turn.tokens));

    Ok((headers, body).into_response())
}
