//! A scripted chat-completion upstream for integration tests.
//!
//! Runs a Tokio listener on its own thread, records every request it receives and
//! answers each one with the same [`Script`]: a status line, then body chunks written
//! with optional delays, then an optional pause before the connection is closed.

#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener as StdListener};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use sentstream::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const MAX_HEADERS: usize = 64;
const INITIAL_BUF_SIZE: usize = 4096;

/// A request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

/// How the upstream answers.
#[derive(Debug, Clone)]
pub struct Script {
    status: u16,
    content_type: &'static str,
    chunks: Vec<(Duration, Bytes)>,
    linger: Duration,
}

impl Script {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/event-stream",
            chunks: Vec::new(),
            linger: Duration::ZERO,
        }
    }

    /// A `200` with a JSON body.
    pub fn json(body: &str) -> Self {
        Self::status(200).content_type("application/json").chunk(body)
    }

    /// A `200` event stream carrying one `data:` line per fragment, then `[DONE]`.
    pub fn deltas(fragments: &[&str]) -> Self {
        let mut script = Self::status(200);
        for fragment in fragments {
            script = script.chunk(delta_line(fragment));
        }
        script.chunk("data: [DONE]\n\n")
    }

    pub fn content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn chunk(self, bytes: impl Into<String>) -> Self {
        self.chunk_after(Duration::ZERO, bytes)
    }

    pub fn chunk_after(mut self, delay: Duration, bytes: impl Into<String>) -> Self {
        self.chunks.push((delay, Bytes::from(bytes.into())));
        self
    }

    /// Keeps the connection open this long after the last chunk.
    pub fn linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }
}

/// One server-sent event carrying `fragment` as a content delta.
pub fn delta_line(fragment: &str) -> String {
    let payload = serde_json::json!({ "choices": [{ "delta": { "content": fragment } }] });
    format!("data: {payload}\n\n")
}

/// A running scripted upstream.
pub struct Upstream {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Upstream {
    pub fn start(script: Script) -> Self {
        let (tx, rx) = mpsc::channel();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime");
            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("report upstream address");

                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        continue;
                    };
                    let script = script.clone();
                    let recorded = Arc::clone(&recorded);
                    tokio::spawn(async move {
                        let _ = serve(stream, script, recorded).await;
                    });
                }
            });
        });

        let addr = rx.recv().expect("upstream address");
        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}/v1/openai/chat/completions", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests lock").clone()
    }
}

/// A URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = StdListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{addr}/v1/openai/chat/completions")
}

async fn serve(
    mut stream: TcpStream,
    script: Script,
    recorded: Arc<Mutex<Vec<Recorded>>>,
) -> std::io::Result<()> {
    let mut buf = BytesMut::with_capacity(INITIAL_BUF_SIZE);
    let request = loop {
        if stream.read_buf(&mut buf).await? == 0 {
            return Ok(());
        }
        if let Some(request) = parse_request(&buf) {
            break request;
        }
    };
    recorded.lock().expect("requests lock").push(request);

    let status = StatusCode::from_u16(script.status);
    let mut head = BytesMut::with_capacity(256);
    head.extend_from_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
        .as_bytes(),
    );
    head.extend_from_slice(format!("Content-Type: {}\r\n", script.content_type).as_bytes());
    head.extend_from_slice(b"Cache-Control: no-cache\r\nConnection: close\r\n\r\n");
    stream.write_all(&head).await?;
    stream.flush().await?;

    for (delay, bytes) in &script.chunks {
        if !delay.is_zero() {
            tokio::time::sleep(*delay).await;
        }
        stream.write_all(bytes).await?;
        stream.flush().await?;
    }

    if !script.linger.is_zero() {
        tokio::time::sleep(script.linger).await;
    }
    stream.shutdown().await
}

/// Parses one complete request out of `buf`, or `None` if more bytes are needed.
fn parse_request(buf: &[u8]) -> Option<Recorded> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut raw = httparse::Request::new(&mut headers);
    let offset = match raw.parse(buf).expect("well-formed request") {
        httparse::Status::Complete(offset) => offset,
        httparse::Status::Partial => return None,
    };

    let headers: Vec<(String, String)> = raw
        .headers
        .iter()
        .map(|h| (h.name.to_owned(), String::from_utf8_lossy(h.value).into_owned()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    if buf.len() < offset + content_length {
        return None;
    }

    Some(Recorded {
        method: raw.method.unwrap_or_default().to_owned(),
        path: raw.path.unwrap_or_default().to_owned(),
        headers,
        body: buf[offset..offset + content_length].to_vec(),
    })
}
