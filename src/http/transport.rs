//! The seam between the chat client and whatever actually speaks HTTP.

use std::fmt;
use std::io::{BufRead, Read};

use thiserror::Error;

use super::{Headers, StatusCode};

/// Errors raised by a [`Transport`] before or while moving bytes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or no response head arrived
    /// (connection refused, DNS, TLS, timeout).
    #[error("request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("I/O error while reading response: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(Box::new(err))
    }
}

/// A JSON `POST` handed to a [`Transport`].
#[derive(Debug, Clone, Copy)]
pub struct PostRequest<'a> {
    pub url: &'a str,
    pub headers: &'a Headers,
    pub body: &'a [u8],
    /// Read-buffer capacity for the response body, in bytes. Values below 1 are
    /// treated as 1.
    pub chunk_size: usize,
}

/// A response whose head has arrived and whose body is still on the wire.
///
/// Dropping the value releases the underlying connection.
pub struct TransportResponse {
    status: StatusCode,
    body: Box<dyn BufRead + Send>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl BufRead + Send + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Consumes the response, handing over ownership of the body reader.
    pub fn into_body(self) -> Box<dyn BufRead + Send> {
        self.body
    }

    /// Reads the remaining body as text, replacing invalid UTF-8.
    ///
    /// At most `limit` bytes are read; anything beyond is left unread.
    pub fn text(self, limit: usize) -> Result<String, TransportError> {
        match self.partial_text(limit) {
            (text, None) => Ok(text),
            (_, Some(e)) => Err(e),
        }
    }

    /// Like [`text`](Self::text), but keeps whatever arrived before a read error.
    ///
    /// Returns the text read so far together with the error that cut it short, if any.
    pub fn partial_text(self, limit: usize) -> (String, Option<TransportError>) {
        let mut raw = Vec::new();
        let mut body = self.body.take(limit as u64);
        // `read_to_end` appends everything read before an error.
        let error = body.read_to_end(&mut raw).err().map(TransportError::from);
        (String::from_utf8_lossy(&raw).into_owned(), error)
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends a JSON `POST` and returns the response head with a blocking,
/// line-readable body.
///
/// Implementations must return as soon as the status is known so that streaming
/// callers can consume the body incrementally.
pub trait Transport {
    fn post(&self, request: PostRequest<'_>) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(&self, request: PostRequest<'_>) -> Result<TransportResponse, TransportError> {
        (**self).post(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn post(&self, request: PostRequest<'_>) -> Result<TransportResponse, TransportError> {
        (**self).post(request)
    }
}
