//! # sentstream
//!
//! A blocking client for OpenAI-style chat-completion endpoints that turns a
//! streamed reply into complete sentences as soon as each one is finished.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sentstream::config::GenerateOptions;
//! use sentstream::llm::{ChatMessage, Reply, generate};
//!
//! let history = vec![
//!     ChatMessage::user("My name is Sreejan."),
//!     ChatMessage::assistant("Nice to meet you, Sreejan. How can I help?"),
//!     ChatMessage::user("Write 10 lines about India"),
//! ];
//!
//! match generate(&history, &GenerateOptions::default()) {
//!     Reply::Sentences(stream) => {
//!         for sentence in stream {
//!             match sentence {
//!                 Ok(sentence) => println!("AI: {sentence}"),
//!                 Err(e) => eprintln!("{}", e.diagnostic()),
//!             }
//!         }
//!     }
//!     Reply::Text(text) => println!("{text}"),
//! }
//! ```

// ── Modules ───────────────────────────────────────────────────────────────────
pub mod config;
pub mod http;
pub mod llm;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use config::{ClientConfig, ConfigError, GenerateOptions};
pub use http::{HttpClient, StatusCode, Transport, TransportError};
pub use llm::{ChatClient, ChatError, ChatMessage, Reply, Role, Segmenter, SentenceStream, generate};
