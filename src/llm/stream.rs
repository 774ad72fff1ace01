//! Turning a streamed response body into a sequence of sentences.

use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, Read};

use tracing::{debug, error, trace, warn};

use super::ChatError;
use super::frame::{FrameError, StreamFrame, decode_bytes};
use super::segmenter::Segmenter;
use crate::http::TransportError;

type FragmentHook = Box<dyn FnMut(&str) + Send>;

/// Longest line we will buffer (1 MiB). Longer lines are skipped as malformed frames.
pub const MAX_LINE_SIZE: usize = 1024 * 1024;

/// How much of a skipped line goes into the log.
const LOG_PREVIEW: usize = 200;

/// Counters for one streamed reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Non-blank lines read from the body.
    pub frames: usize,
    pub deltas: usize,
    pub malformed: usize,
    pub ignorable: usize,
}

/// The sentences of one streamed reply, produced as the body arrives.
///
/// Each item is a completed sentence, or the error that ended the stream. After an
/// error item the iterator is finished. The response body is owned by the stream
/// and is dropped, closing the connection, as soon as the reply ends for any reason,
/// or when the stream itself is dropped.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use sentstream::llm::SentenceStream;
///
/// let body = concat!(
///     "data: {\"choices\":[{\"delta\":{\"content\":\"Nice to \"}}]}\n",
///     "data: {\"choices\":[{\"delta\":{\"content\":\"meet you. \"}}]}\n",
///     "data: [DONE]\n",
/// );
/// let sentences: Vec<String> = SentenceStream::new(Cursor::new(body))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(sentences, vec!["Nice to meet you."]);
/// ```
pub struct SentenceStream {
    body: Option<Box<dyn BufRead + Send>>,
    segmenter: Segmenter,
    ready: VecDeque<String>,
    failure: Option<ChatError>,
    line: Vec<u8>,
    malformed_run: usize,
    max_consecutive_malformed: Option<usize>,
    on_fragment: Option<FragmentHook>,
    stats: StreamStats,
}

impl SentenceStream {
    /// Wraps a line-oriented response body with no limit on malformed frames.
    pub fn new(body: impl BufRead + Send + 'static) -> Self {
        Self::from_boxed(Box::new(body))
    }

    pub(crate) fn from_boxed(body: Box<dyn BufRead + Send>) -> Self {
        Self {
            body: Some(body),
            segmenter: Segmenter::new(),
            ready: VecDeque::new(),
            failure: None,
            line: Vec::new(),
            malformed_run: 0,
            max_consecutive_malformed: None,
            on_fragment: None,
            stats: StreamStats::default(),
        }
    }

    /// A stream that yields `error` once and then ends.
    pub fn failed(error: ChatError) -> Self {
        Self {
            body: None,
            segmenter: Segmenter::new(),
            ready: VecDeque::new(),
            failure: Some(error),
            line: Vec::new(),
            malformed_run: 0,
            max_consecutive_malformed: None,
            on_fragment: None,
            stats: StreamStats::default(),
        }
    }

    /// Ends the stream with [`ChatError::TooManyMalformed`] once more than `limit`
    /// malformed frames arrive in a row. `None` disables the limit.
    #[must_use]
    pub fn max_consecutive_malformed(mut self, limit: Option<usize>) -> Self {
        self.max_consecutive_malformed = limit;
        self
    }

    /// Calls `hook` with every content fragment as it arrives, before segmentation.
    #[must_use]
    pub fn on_fragment(mut self, hook: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_fragment = Some(Box::new(hook));
        self
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Text received but not yet emitted as a sentence.
    pub fn pending(&self) -> &str {
        self.segmenter.pending()
    }

    /// Returns `true` while the response body is still held open.
    pub fn is_open(&self) -> bool {
        self.body.is_some()
    }

    /// Drops the body and queues whatever text is still pending.
    fn finish(&mut self) {
        if self.body.take().is_some() {
            debug!(
                frames = self.stats.frames,
                deltas = self.stats.deltas,
                malformed = self.stats.malformed,
                "stream closed, connection released"
            );
        }
        self.ready.extend(self.segmenter.flush());
    }

    fn fail(&mut self, error: ChatError) {
        self.finish();
        self.failure = Some(error);
    }

    /// Reads and handles one line. Returns `false` once the body is exhausted.
    fn pump(&mut self) -> bool {
        let Some(body) = self.body.as_mut() else {
            return false;
        };

        self.line.clear();
        let read = body
            .by_ref()
            .take(MAX_LINE_SIZE as u64 + 1)
            .read_until(b'\n', &mut self.line);
        match read {
            Ok(0) => {
                debug!("response body ended without a sentinel");
                self.finish();
                return false;
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "failed reading response body");
                self.fail(ChatError::Transport(TransportError::Io(e)));
                return false;
            }
        }

        let oversized = self.line.len() > MAX_LINE_SIZE && self.line.last() != Some(&b'\n');
        let frame = if oversized {
            // Drop the rest of the line without buffering it.
            if let Err(e) = body.skip_until(b'\n') {
                error!(error = %e, "failed reading response body");
                self.fail(ChatError::Transport(TransportError::Io(e)));
                return false;
            }
            StreamFrame::Malformed(FrameError::TooLong {
                limit: MAX_LINE_SIZE,
            })
        } else {
            let line = trim_line_end(&self.line);
            if line.is_empty() {
                // Blank lines separate server-sent events; they are not frames.
                return true;
            }
            decode_bytes(line)
        };
        self.stats.frames += 1;

        match frame {
            StreamFrame::ContentDelta(text) => {
                self.malformed_run = 0;
                self.stats.deltas += 1;
                trace!(fragment = %text, "content delta");
                if let Some(hook) = self.on_fragment.as_mut() {
                    hook(&text);
                }
                self.ready.extend(self.segmenter.feed(&text));
            }
            StreamFrame::StreamEnd => {
                self.finish();
                return false;
            }
            StreamFrame::Ignorable => {
                self.malformed_run = 0;
                self.stats.ignorable += 1;
            }
            StreamFrame::Malformed(reason) => {
                self.malformed_run += 1;
                self.stats.malformed += 1;
                let preview = &self.line[..self.line.len().min(LOG_PREVIEW)];
                warn!(
                    error = %reason,
                    line = %String::from_utf8_lossy(preview),
                    "skipping malformed frame"
                );
                if let Some(limit) = self.max_consecutive_malformed {
                    if self.malformed_run > limit {
                        self.fail(ChatError::TooManyMalformed {
                            count: self.malformed_run,
                        });
                        return false;
                    }
                }
            }
        }
        true
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

impl Iterator for SentenceStream {
    type Item = Result<String, ChatError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(sentence) = self.ready.pop_front() {
                return Some(Ok(sentence));
            }
            if !self.pump() {
                if let Some(sentence) = self.ready.pop_front() {
                    return Some(Ok(sentence));
                }
                return self.failure.take().map(Err);
            }
        }
    }
}

impl fmt::Debug for SentenceStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentenceStream")
            .field("open", &self.is_open())
            .field("pending", &self.segmenter.pending())
            .field("ready", &self.ready.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
