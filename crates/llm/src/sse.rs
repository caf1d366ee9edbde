//! Decoding of streamed chat completions.
//!
//! Groq emits OpenAI-style server-sent events: `data: {json}` lines
//! terminated by a `data: [DONE]` sentinel. Network reads can split or
//! coalesce lines arbitrarily, so bytes are buffered and drained one
//! complete line at a time.

use std::collections::VecDeque;

use futures::StreamExt;
use serde::Deserialize;

use crate::{CompletionStream, LlmError, StreamChunk};

#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// Outcome of parsing one SSE line
#[derive(Debug, PartialEq)]
pub(crate) enum SseEvent {
    /// A content delta and/or finish reason
    Chunk(StreamChunk),
    /// The `[DONE]` sentinel
    Done,
    /// Nothing of interest (keep-alive, role-only delta)
    Skip,
}

/// Parses a single line of the event stream.
pub(crate) fn parse_sse_line(line: &str) -> Result<SseEvent, LlmError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(SseEvent::Skip);
    }

    let Some(data) = line.strip_prefix("data: ") else {
        return Ok(SseEvent::Skip);
    };

    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let chunk: ChatStreamChunk = serde_json::from_str(data)
        .map_err(|e| LlmError::Stream(format!("Invalid stream chunk: {}", e)))?;

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(SseEvent::Skip);
    };

    match (choice.delta.content, choice.finish_reason) {
        (None, None) => Ok(SseEvent::Skip),
        (content, finish_reason) => Ok(SseEvent::Chunk(StreamChunk {
            delta: content.unwrap_or_default(),
            finish_reason,
        })),
    }
}

/// Turns an HTTP response carrying SSE data into a stream of token chunks.
///
/// The stream ends when the provider sends `[DONE]`, the connection
/// closes, or a decode error is yielded.
pub(crate) fn decode_token_stream(response: reqwest::Response) -> CompletionStream {
    let mut bytes = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut buffer: VecDeque<u8> = VecDeque::with_capacity(8192);

        while let Some(result) = bytes.next().await {
            let data = match result {
                Ok(data) => data,
                Err(e) => {
                    yield Err(LlmError::Stream(format!("Connection error: {}", e)));
                    return;
                }
            };

            buffer.extend(data.iter());

            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                let line = match std::str::from_utf8(&line_bytes) {
                    Ok(line) => line,
                    Err(e) => {
                        yield Err(LlmError::Stream(format!("Invalid UTF-8 in stream: {}", e)));
                        return;
                    }
                };

                match parse_sse_line(line) {
                    Ok(SseEvent::Chunk(chunk)) => yield Ok(chunk),
                    Ok(SseEvent::Done) => return,
                    Ok(SseEvent::Skip) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }
    })
}
