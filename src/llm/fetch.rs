//! Extraction of the reply text from a non-streamed completion body.

use serde::Deserialize;
use serde_json::Value;

use super::ChatError;

/// Where the reply lives in a completion body, for error messages.
pub const CONTENT_PATH: &str = "choices[0].message.content";

#[derive(Debug, Deserialize)]
struct CompletionBody {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Pulls `choices[0].message.content` out of a successful response body.
///
/// # Errors
///
/// - [`ChatError::Decode`] — the body is not JSON.
/// - [`ChatError::Schema`] — the body is JSON but the content string is missing.
///
/// Both keep the raw body for diagnostics.
pub fn extract_reply(body: &str) -> Result<String, ChatError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ChatError::Decode {
        source: e,
        body: body.to_owned(),
    })?;

    let schema_error = |detail: String| ChatError::Schema {
        path: CONTENT_PATH,
        detail,
        body: body.to_owned(),
    };

    let parsed: CompletionBody =
        serde_json::from_value(value).map_err(|e| schema_error(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| schema_error("`choices` is empty".into()))?;
    choice
        .message
        .content
        .ok_or_else(|| schema_error("`content` is null".into()))
}
