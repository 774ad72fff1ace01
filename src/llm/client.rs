//! The caller-facing chat client.

use tracing::{debug, warn};

use super::fetch::extract_reply;
use super::models::KnownModel;
use super::request::CompletionRequest;
use super::{ChatError, ChatMessage, Reply, SentenceStream};
use crate::config::{ClientConfig, GenerateOptions};
use crate::http::{Headers, HttpClient, PostRequest, Transport, TransportResponse};

/// Largest non-streamed reply body we will buffer (16 MiB).
const MAX_REPLY_BODY: usize = 16 * 1024 * 1024;

/// Largest error body kept for diagnostics (64 KiB).
const MAX_ERROR_BODY: usize = 64 * 1024;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const ACCEPT_STREAM: &str = "text/event-stream";
const ACCEPT_JSON: &str = "application/json";

/// Sends conversations to one chat-completion endpoint.
///
/// Each call is a single blocking request with its own state; a client can be
/// shared freely between calls. The transport defaults to [`HttpClient`] and can be
/// swapped for anything implementing [`Transport`].
///
/// # Examples
///
/// ```rust,no_run
/// use sentstream::config::{ClientConfig, GenerateOptions};
/// use sentstream::llm::{ChatClient, ChatMessage};
///
/// let client = ChatClient::from_config(ClientConfig::default())?;
/// let history = [ChatMessage::user("My name is Sreejan.")];
///
/// for sentence in client.stream(&history, client.defaults())? {
///     println!("AI: {}", sentence?);
/// }
///
/// let text = client.complete(&history, &GenerateOptions::default().max_tokens(64))?;
/// println!("{text}");
/// # Ok::<(), sentstream::llm::ChatError>(())
/// ```
#[derive(Debug)]
pub struct ChatClient<T = HttpClient> {
    transport: T,
    endpoint: String,
    extra_headers: Headers,
    max_consecutive_malformed: Option<usize>,
    defaults: GenerateOptions,
}

impl ChatClient<HttpClient> {
    /// A client for the default endpoint and options.
    pub fn new() -> Result<Self, ChatError> {
        Self::from_config(ClientConfig::default())
    }

    /// Validates `config` and builds a client backed by [`HttpClient`].
    pub fn from_config(config: ClientConfig) -> Result<Self, ChatError> {
        config.validate()?;
        let transport = HttpClient::with_timeout(config.timeout())?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> ChatClient<T> {
    /// Builds a client around an existing transport.
    ///
    /// `config` is taken as-is; call [`ClientConfig::validate`] first if it came
    /// from outside.
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint,
            extra_headers: config.headers.into_iter().collect(),
            max_consecutive_malformed: config.max_consecutive_malformed,
            defaults: config.generate,
        }
    }

    /// The options configured for this client.
    pub fn defaults(&self) -> &GenerateOptions {
        &self.defaults
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `history` and returns the reply in the shape `options.stream` asks for.
    ///
    /// Never fails: a streamed call that cannot start yields a stream whose only item
    /// is the error, and a buffered call that fails yields its
    /// [diagnostic](ChatError::diagnostic) text.
    pub fn generate(&self, history: &[ChatMessage], options: &GenerateOptions) -> Reply {
        if options.stream {
            match self.stream(history, options) {
                Ok(stream) => Reply::Sentences(stream),
                Err(e) => {
                    warn!(error = %e, "streaming completion failed");
                    Reply::Sentences(SentenceStream::failed(e))
                }
            }
        } else {
            match self.complete(history, options) {
                Ok(text) => Reply::Text(text),
                Err(e) => {
                    warn!(error = %e, "completion failed");
                    Reply::Text(e.diagnostic())
                }
            }
        }
    }

    /// Starts a streamed completion and returns its sentences.
    ///
    /// # Errors
    ///
    /// - [`ChatError::Transport`] — no response arrived.
    /// - [`ChatError::HttpStatus`] — the upstream answered with a non-2xx status; the
    ///   error carries the start of the response body, or as much of it as arrived.
    pub fn stream(
        &self,
        history: &[ChatMessage],
        options: &GenerateOptions,
    ) -> Result<SentenceStream, ChatError> {
        let response = self.send(history, options, true)?;
        if !response.status().is_success() {
            return Err(rejected(response));
        }

        Ok(SentenceStream::from_boxed(response.into_body())
            .max_consecutive_malformed(self.max_consecutive_malformed))
    }

    /// Runs a buffered completion and returns the full reply text.
    ///
    /// # Errors
    ///
    /// - [`ChatError::Transport`] — no response arrived or the body broke off.
    /// - [`ChatError::HttpStatus`] — non-2xx status.
    /// - [`ChatError::Decode`] / [`ChatError::Schema`] — the body is not a completion.
    pub fn complete(
        &self,
        history: &[ChatMessage],
        options: &GenerateOptions,
    ) -> Result<String, ChatError> {
        let response = self.send(history, options, false)?;
        if !response.status().is_success() {
            return Err(rejected(response));
        }

        let body = response.text(MAX_REPLY_BODY)?;
        extract_reply(&body)
    }

    fn headers(&self, stream: bool) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "application/json");
        headers.insert("Accept", if stream { ACCEPT_STREAM } else { ACCEPT_JSON });
        headers.insert("User-Agent", USER_AGENT);
        for (name, value) in self.extra_headers.iter() {
            headers.set(name, value);
        }
        headers
    }

    fn send(
        &self,
        history: &[ChatMessage],
        options: &GenerateOptions,
        stream: bool,
    ) -> Result<TransportResponse, ChatError> {
        options.validate()?;
        if !KnownModel::is_known(&options.model) {
            debug!(model = %options.model, "model is not in the known list, sending as-is");
        }

        let body = CompletionRequest::new(history, options, stream)
            .to_json()
            .map_err(ChatError::Encode)?;
        let headers = self.headers(stream);

        debug!(
            endpoint = %self.endpoint,
            model = %options.model,
            messages = history.len() + 1,
            stream,
            "dispatching chat completion"
        );

        let response = self.transport.post(PostRequest {
            url: &self.endpoint,
            headers: &headers,
            body: &body,
            chunk_size: options.chunk_size,
        })?;
        Ok(response)
    }
}

/// Turns a non-2xx response into [`ChatError::HttpStatus`], keeping whatever part of
/// the body could be read.
fn rejected(response: TransportResponse) -> ChatError {
    let status = response.status();
    let (body, read_error) = response.partial_text(MAX_ERROR_BODY);
    match read_error {
        Some(e) => warn!(%status, error = %e, bytes = body.len(), "error response body broke off"),
        None => debug!(%status, bytes = body.len(), "upstream rejected the request"),
    }
    ChatError::HttpStatus { status, body }
}
