//! Scripted response bodies and a recording transport.
//!
//! This module is intended for:
//! - unit/integration tests of code that consumes engine streams
//! - replaying recorded pull/push/event sessions (JSON Lines, one frame per line)
//!
//! It is gated behind `cfg(test)` or the `mock` Cargo feature.

use std::{
    collections::{HashMap, VecDeque},
    fmt, io,
    pin::Pin,
    task::{Context, Poll, ready},
    time::Duration,
};

use serde_json::Value;
use tokio::{
    io::{AsyncRead, ReadBuf},
    sync::Mutex,
    time::Sleep,
};

use crate::{
    error::{Error, Result},
    request::ApiRequest,
    transport::{ResponseBody, Transport},
};

#[derive(Debug, Clone)]
enum Step {
    Bytes(Vec<u8>),
    Pause(Duration),
    Fail(io::ErrorKind, String),
    Hang,
}

/// A scripted response body.
///
/// Each step is observed by the reader as its own read (a byte chunk may be
/// split further if the reader's buffer is small). When the script runs out
/// the body reports end of stream, unless it ends with [`hang`](Self::hang).
#[derive(Debug, Clone, Default)]
pub struct MockBody {
    steps: Vec<Step>,
}

impl MockBody {
    /// An empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a body from JSON Lines content, one frame per non-empty line.
    pub fn from_jsonl_str(s: &str) -> Result<Self> {
        let mut body = Self::new();
        for (idx, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let frame: Value = serde_json::from_str(line).map_err(|e| Error::MalformedMessage {
                dispatched: 0,
                message: format!("invalid jsonl at line {}: {}", idx + 1, e),
            })?;
            body = body.frame(frame);
        }

        Ok(body)
    }

    /// Send one JSON frame.
    #[must_use]
    pub fn frame(self, frame: Value) -> Self {
        self.bytes(frame.to_string())
    }

    /// Send several frames, concatenated into a single chunk.
    #[must_use]
    pub fn frames(self, frames: impl IntoIterator<Item = Value>) -> Self {
        let joined: String = frames.into_iter().map(|f| f.to_string()).collect();
        self.bytes(joined)
    }

    /// Send raw bytes. Empty chunks are ignored.
    #[must_use]
    pub fn bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        if !bytes.is_empty() {
            self.steps.push(Step::Bytes(bytes));
        }
        self
    }

    /// Wait before the next step.
    #[must_use]
    pub fn pause(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Pause(duration));
        self
    }

    /// Fail the next read.
    #[must_use]
    pub fn fail(mut self, kind: io::ErrorKind, message: impl Into<String>) -> Self {
        self.steps.push(Step::Fail(kind, message.into()));
        self
    }

    /// Block every read from here on, like an idle event stream.
    #[must_use]
    pub fn hang(mut self) -> Self {
        self.steps.push(Step::Hang);
        self
    }

    /// Turn the script into a reader.
    #[must_use]
    pub fn into_reader(self) -> MockReader {
        MockReader {
            steps: self.steps.into(),
            sleep: None,
        }
    }
}

/// [`AsyncRead`] side of a [`MockBody`].
pub struct MockReader {
    steps: VecDeque<Step>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl fmt::Debug for MockReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockReader")
            .field("steps", &self.steps)
            .field("sleeping", &self.sleep.is_some())
            .finish()
    }
}

impl AsyncRead for MockReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        loop {
            if let Some(sleep) = this.sleep.as_mut() {
                ready!(sleep.as_mut().poll(cx));
                this.sleep = None;
            }

            match this.steps.front_mut() {
                None => return Poll::Ready(Ok(())),
                Some(Step::Bytes(bytes)) => {
                    let n = bytes.len().min(buf.remaining());
                    buf.put_slice(&bytes[..n]);
                    bytes.drain(..n);
                    if bytes.is_empty() {
                        this.steps.pop_front();
                    }
                    return Poll::Ready(Ok(()));
                }
                Some(Step::Pause(duration)) => {
                    let duration = *duration;
                    this.steps.pop_front();
                    this.sleep = Some(Box::pin(tokio::time::sleep(duration)));
                }
                Some(Step::Fail(kind, message)) => {
                    let err = io::Error::new(*kind, message.clone());
                    this.steps.pop_front();
                    return Poll::Ready(Err(err));
                }
                Some(Step::Hang) => return Poll::Pending,
            }
        }
    }
}

#[derive(Debug, Clone)]
enum MockResponse {
    Body(MockBody),
    Error(String),
}

/// A [`Transport`] that answers from a script and records every request.
///
/// Responses are keyed by endpoint path (without API version or query) and
/// may be served any number of times.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: HashMap<String, MockResponse>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// A transport with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `path` with `body`.
    #[must_use]
    pub fn respond(mut self, path: impl Into<String>, body: MockBody) -> Self {
        self.responses.insert(path.into(), MockResponse::Body(body));
        self
    }

    /// Fail requests for `path` with a transport error.
    #[must_use]
    pub fn fail(mut self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .insert(path.into(), MockResponse::Error(message.into()));
        self
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().await.clone()
    }
}

impl Transport for MockTransport {
    fn send<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseBody>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().await.push(request.clone());

            match self.responses.get(request.path()) {
                Some(MockResponse::Body(body)) => {
                    let reader: ResponseBody = Box::new(body.clone().into_reader());
                    Ok(reader)
                }
                Some(MockResponse::Error(message)) => Err(Error::transport(message.clone())),
                None => Err(Error::transport(format!(
                    "no mock response for '{}'",
                    request.path()
                ))),
            }
        })
    }
}
