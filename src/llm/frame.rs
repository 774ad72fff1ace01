//! Decoding of streamed chat-completion lines into [`StreamFrame`]s.
//!
//! Upstreams speak server-sent events: each useful line looks like
//! `data: {"choices":[{"delta":{"content":"..."}}]}` and the stream closes with
//! `data: [DONE]`. Every line decodes to exactly one frame, and a line that cannot
//! be understood becomes [`StreamFrame::Malformed`] instead of an error, so one bad
//! frame never ends the reply.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Sentinel payload that marks the end of a streamed reply.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_FIELD: &str = "data:";

/// Non-data SSE fields. Lines carrying them hold no content.
const OTHER_FIELDS: [&str; 3] = ["event:", "id:", "retry:"];

/// Why a single frame could not be decoded.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("frame is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("frame does not have the chunk shape: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("frame exceeds {limit} bytes")]
    TooLong { limit: usize },
}

/// One decoded unit of a streamed response.
#[derive(Debug)]
pub enum StreamFrame {
    /// A piece of assistant text.
    ContentDelta(String),
    /// The upstream signalled the end of the reply.
    StreamEnd,
    /// The line could not be decoded; skip it and keep reading.
    Malformed(FrameError),
    /// A well-formed frame with nothing to show (role-only, finish reason, keep-alive).
    Ignorable,
}

impl StreamFrame {
    /// Returns the delta text, if this frame carries any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::ContentDelta(text) => Some(text),
            _ => None,
        }
    }
}

// Only the path we read is modelled; unknown fields (id, model, usage, ...) are ignored.
#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Removes the SSE `data:` prefix, returning `None` for lines that carry another
/// SSE field or a comment.
fn strip_framing(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(rest) = line.strip_prefix(DATA_FIELD) {
        return Some(rest.strip_prefix(' ').unwrap_or(rest));
    }
    if line.starts_with(':') || OTHER_FIELDS.iter().any(|field| line.starts_with(field)) {
        return None;
    }
    Some(line)
}

/// Decodes one line of a streamed response.
///
/// # Examples
///
/// ```
/// use sentstream::llm::frame::{decode_line, StreamFrame};
///
/// let frame = decode_line(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#);
/// assert_eq!(frame.content(), Some("Hi"));
///
/// assert!(matches!(decode_line("data: [DONE]"), StreamFrame::StreamEnd));
/// assert!(matches!(decode_line("data: {oops"), StreamFrame::Malformed(_)));
/// ```
pub fn decode_line(line: &str) -> StreamFrame {
    let Some(payload) = strip_framing(line) else {
        return StreamFrame::Ignorable;
    };
    let payload = payload.trim();
    if payload.is_empty() || payload.contains(DONE_SENTINEL) {
        return StreamFrame::StreamEnd;
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => return StreamFrame::Malformed(FrameError::Json(e)),
    };
    let chunk = match ChunkPayload::deserialize(value) {
        Ok(chunk) => chunk,
        Err(e) => return StreamFrame::Malformed(FrameError::Schema(e)),
    };

    match chunk.choices.into_iter().next() {
        Some(ChunkChoice {
            delta: Some(Delta { content: Some(text) }),
            ..
        }) => StreamFrame::ContentDelta(text),
        Some(ChunkChoice {
            finish_reason: Some(reason),
            ..
        }) => {
            debug!(finish_reason = %reason, "upstream finished generating");
            StreamFrame::Ignorable
        }
        _ => StreamFrame::Ignorable,
    }
}

/// Decodes a raw line, treating invalid UTF-8 as a malformed frame.
pub fn decode_bytes(line: &[u8]) -> StreamFrame {
    match std::str::from_utf8(line) {
        Ok(line) => decode_line(line),
        Err(e) => StreamFrame::Malformed(e.into()),
    }
}
