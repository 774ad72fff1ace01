//! Blocking [`Transport`] backed by `reqwest`.

use std::io::BufReader;
use std::time::Duration;

use tracing::debug;

use super::{PostRequest, StatusCode, Transport, TransportError, TransportResponse};

/// The default transport: a `reqwest` blocking client.
///
/// The response body is wrapped in a [`BufReader`] whose capacity is the request's
/// `chunk_size`, so the read granularity follows the caller's hint.
///
/// # Examples
///
/// ```rust,no_run
/// use std::time::Duration;
/// use sentstream::http::HttpClient;
///
/// let client = HttpClient::with_timeout(Some(Duration::from_secs(120)))?;
/// # Ok::<(), sentstream::http::TransportError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Creates a client with no overall timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(None)
    }

    /// Creates a client whose requests, body reads included, give up after `timeout`.
    ///
    /// `None` disables the timeout, which is what long streamed replies usually want.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let inner = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { inner })
    }
}

impl Transport for HttpClient {
    fn post(&self, request: PostRequest<'_>) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .inner
            .post(request.url)
            .body(request.body.to_vec());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        debug!(url = request.url, bytes = request.body.len(), "sending request");
        let response = builder.send()?;
        let status = StatusCode::from_u16(response.status().as_u16());
        debug!(url = request.url, status = %status, "response head received");

        let reader = BufReader::with_capacity(request.chunk_size.max(1), response);
        Ok(TransportResponse::new(status, reader))
    }
}
