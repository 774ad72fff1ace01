//! The JSON body posted to the chat-completion endpoint.

use serde::Serialize;

use super::ChatMessage;
use crate::config::GenerateOptions;

/// Request payload in the OpenAI chat-completion shape.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stop: Vec<String>,
    pub stream: bool,
}

impl<'a> CompletionRequest<'a> {
    /// Builds the payload for `history`, with the options' system prompt prepended.
    ///
    /// The caller's history is copied, never modified.
    pub fn new(history: &[ChatMessage], options: &'a GenerateOptions, stream: bool) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(options.system_prompt.as_str()));
        messages.extend_from_slice(history);

        Self {
            model: &options.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stop: Vec::new(),
            stream,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
