//! Chat-completion client with sentence-by-sentence streaming.
//!
//! ## Pieces
//!
//! - [`ChatClient`] — builds requests and picks the streaming or buffered path.
//! - [`SentenceStream`] — reads a streamed body line by line and yields sentences.
//! - [`frame`] — decodes each streamed line into a [`StreamFrame`].
//! - [`Segmenter`] — cuts completed sentences out of the text received so far.
//! - [`fetch`] — pulls the reply out of a non-streamed body.
//!
//! ## Failure policy
//!
//! A malformed or unexpected frame inside a stream is logged and skipped. Failures of
//! the whole response (no connection, non-2xx status, unreadable body) come back as a
//! [`ChatError`], which keeps any raw body text and can be rendered as a plain
//! diagnostic string with [`ChatError::diagnostic`]. Nothing is retried.

use thiserror::Error;
use tracing::warn;

use crate::config::{ConfigError, GenerateOptions};
use crate::http::{StatusCode, TransportError};

pub mod client;
pub mod fetch;
pub mod frame;
pub mod message;
pub mod models;
pub mod request;
pub mod segmenter;
pub mod stream;

pub use client::ChatClient;
pub use frame::{StreamFrame, decode_line};
pub use message::{ChatMessage, Role};
pub use models::KnownModel;
pub use segmenter::{Segmenter, Sentences};
pub use stream::{SentenceStream, StreamStats};

/// Errors produced by a chat-completion call.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No usable response: connection, DNS or TLS failure, or the body broke off.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("upstream returned HTTP {status}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("response body is not valid JSON: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("expected `{path}` in response: {detail}")]
    Schema {
        path: &'static str,
        detail: String,
        body: String,
    },

    #[error("stream aborted after {count} consecutive malformed frames")]
    TooManyMalformed { count: usize },

    #[error("failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ChatError {
    /// The raw response text this error was raised for, if a response body was read.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { body, .. } | Self::Decode { body, .. } | Self::Schema { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    /// Renders the error as an explanatory string for callers that want text, not types.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentstream::http::StatusCode;
    /// use sentstream::llm::ChatError;
    ///
    /// let err = ChatError::HttpStatus {
    ///     status: StatusCode::BAD_GATEWAY,
    ///     body: "<html>upstream down</html>".into(),
    /// };
    /// assert_eq!(err.diagnostic(), "Response content: <html>upstream down</html>");
    /// ```
    pub fn diagnostic(&self) -> String {
        match self {
            Self::HttpStatus { body, .. } => format!("Response content: {body}"),
            Self::Decode { body, .. } | Self::Schema { body, .. } => {
                format!("Error parsing response: {body}")
            }
            Self::Transport(e) => {
                format!("An error occurred while fetching the response: {e}")
            }
            other => format!("An error occurred: {other}"),
        }
    }
}

/// What [`ChatClient::generate`] hands back.
#[derive(Debug)]
pub enum Reply {
    /// Sentences of a streamed reply, produced as they complete.
    Sentences(SentenceStream),
    /// The full reply text, or a diagnostic string if the call failed.
    Text(String),
}

impl Reply {
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Sentences(_))
    }

    pub fn into_stream(self) -> Option<SentenceStream> {
        match self {
            Self::Sentences(stream) => Some(stream),
            Self::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Sentences(_) => None,
        }
    }
}

/// Sends `history` with a client built from the default configuration.
///
/// Setup failures are reported the same way call failures are: as a failed
/// stream or a diagnostic string.
///
/// ```rust,no_run
/// use sentstream::config::GenerateOptions;
/// use sentstream::llm::{ChatMessage, Reply, generate};
///
/// let history = [ChatMessage::user("Write 10 lines about India")];
/// if let Reply::Sentences(stream) = generate(&history, &GenerateOptions::default()) {
///     for sentence in stream {
///         match sentence {
///             Ok(sentence) => println!("AI: {sentence}"),
///             Err(e) => eprintln!("{}", e.diagnostic()),
///         }
///     }
/// }
/// ```
pub fn generate(history: &[ChatMessage], options: &GenerateOptions) -> Reply {
    match ChatClient::new() {
        Ok(client) => client.generate(history, options),
        Err(e) => {
            warn!(error = %e, "failed to set up chat client");
            if options.stream {
                Reply::Sentences(SentenceStream::failed(e))
            } else {
                Reply::Text(e.diagnostic())
            }
        }
    }
}
