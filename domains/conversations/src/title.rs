//! Conversation title generation
//!
//! New conversations get their title from a separate, non-streamed
//! completion over the opening user message. The call sits on the
//! critical path of the first turn: the conversation row needs a title
//! before the main stream can begin.

use threadline_common::{Error, Result};
use threadline_llm::{CompletionRequest, LlmMessage, LlmRole, LlmService};

use crate::domain::entities::TurnMessage;

const TITLE_SYSTEM_PROMPT: &str = "\
- you will generate a short title based on the first message a user begins a conversation with
- ensure it is not more than 80 characters long
- the title should be a summary of the user's message
- do not use quotes or colons";

/// Generate a title for a new conversation from its opening user message.
///
/// The message is sent to the model as its JSON serialization, role and
/// all. The 80-character bound is a prompt instruction, not enforced
/// here. Failure aborts conversation creation upstream.
pub async fn generate_title(
    llm: &dyn LlmService,
    model: &str,
    message: &TurnMessage,
) -> Result<String> {
    let request = CompletionRequest {
        model: model.to_string(),
        system_prompt: Some(TITLE_SYSTEM_PROMPT.to_string()),
        messages: vec![LlmMessage {
            role: LlmRole::User,
            content: serde_json::to_string(message)?,
        }],
        max_tokens: None,
    };

    let response = llm
        .complete(request)
        .await
        .map_err(|e| Error::Upstream(e.to_string()))?;

    tracing::debug!(
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "Generated conversation title"
    );

    Ok(response.content.trim().to_string())
}
