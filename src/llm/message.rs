//! Conversation messages as sent to a chat-completion endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a conversation.
///
/// A conversation history is just an ordered `[ChatMessage]` owned by the caller.
///
/// # Examples
///
/// ```
/// use sentstream::llm::{ChatMessage, Role};
///
/// let history = vec![
///     ChatMessage::user("My name is Sreejan."),
///     ChatMessage::assistant("Nice to meet you, Sreejan."),
/// ];
/// assert_eq!(history[1].role, Role::Assistant);
///
/// let json = serde_json::to_string(&history[0]).unwrap();
/// assert_eq!(json, r#"{"role":"user","content":"My name is Sreejan."}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&[Role::System, Role::User, Role::Assistant]).unwrap();
        assert_eq!(json, r#"["system","user","assistant"]"#);
    }

    #[test]
    fn message_round_trips_from_wire_shape() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"Hi"}"#).unwrap();
        assert_eq!(msg, ChatMessage::assistant("Hi"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = serde_json::from_str::<ChatMessage>(r#"{"role":"tool","content":""}"#);
        assert!(err.is_err());
    }
}
