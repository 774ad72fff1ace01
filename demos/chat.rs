//! Streams a reply to a short conversation and prints it sentence by sentence.
//!
//! ```text
//! cargo run --example chat [config.toml]
//! RUST_LOG=sentstream=debug cargo run --example chat
//! ```
//!
//! Raw fragments are echoed as they arrive; each completed sentence is then printed
//! on its own line.

use std::io::Write;

use sentstream::ClientConfig;
use sentstream::llm::{ChatClient, ChatMessage, Reply};
use tracing_subscriber::EnvFilter;

const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ClientConfig::from_path(path)?,
        None => ClientConfig::default(),
    };
    let client = ChatClient::from_config(config)?;

    let history = vec![
        ChatMessage::user("My name is Sreejan."),
        ChatMessage::assistant("Nice to meet you, Sreejan. How can I help you today?"),
        ChatMessage::user("Write 10 Lines about India"),
    ];

    match client.generate(&history, client.defaults()) {
        Reply::Sentences(stream) => {
            let stream = stream.on_fragment(|fragment| {
                print!("{fragment}");
                let _ = std::io::stdout().flush();
            });
            for sentence in stream {
                match sentence {
                    Ok(sentence) => println!("\n{GREEN}AI:{RESET} {sentence}"),
                    Err(e) => eprintln!("\n{}", e.diagnostic()),
                }
            }
        }
        Reply::Text(text) => println!("{GREEN}AI:{RESET} {text}"),
    }

    Ok(())
}
