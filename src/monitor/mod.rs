//! Streaming message monitor.
//!
//! Image pulls, pushes and the engine event feed answer with a response body
//! that is an unbounded sequence of JSON objects. A monitor reads that body,
//! cuts it into frames, decodes each frame into a typed message and hands the
//! message to a sink before it reads again:
//!
//! ```text
//! Idle -> Reading -> (Dispatching <-> Reading) -> Completed | Cancelled | Failed
//! ```
//!
//! ## Cancellation
//!
//! The [`CancelToken`] is checked before every dispatch and raced against
//! every read. Once it fires the monitor returns
//! [`MonitorOutcome::Cancelled`] without dispatching frames that are already
//! buffered. Because a cancel may land after the final frame was read, a
//! caller that cancels late can observe either outcome; both are correct.
//! The monitor never closes the body itself. A sink that reports itself
//! closed ([`MessageSink::is_closed`]) stops the monitor the same way.
//!
//! ## Failures
//!
//! A frame that is not valid JSON, or does not decode into the message type,
//! stops the monitor with [`Error::MalformedMessage`]; frames are never
//! skipped. Read errors surface as [`Error::StreamFailure`].

mod frame;
mod stream;

use std::{fmt, marker::PhantomData};

use serde::de::DeserializeOwned;
use tokio::{io::AsyncRead, io::AsyncReadExt, sync::mpsc};

use crate::{
    cancel::CancelToken,
    error::{Error, Result},
    transport::ResponseBody,
    types::{EventMessage, ProgressMessage, StreamMessage},
};

use self::frame::{FrameDecoder, decode_frame};

pub use self::stream::{MessageStream, spawn};

/// How a monitor finished without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorOutcome {
    /// The body ended cleanly.
    Completed,
    /// The cancel token fired first.
    Cancelled,
}

/// What to do with an unfinished frame when the body ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrailingData {
    /// Drop it and report [`MonitorOutcome::Completed`]. Engines sometimes cut
    /// a stream short without signalling an error.
    #[default]
    Ignore,
    /// Fail with [`Error::MalformedMessage`].
    Reject,
}

/// Tuning for a single monitor run.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Bytes reserved for each read.
    pub read_chunk: usize,

    /// Upper bound on a single buffered frame. `None` disables the check.
    pub max_frame_bytes: Option<usize>,

    /// Handling of a partial frame at end of stream.
    pub trailing_data: TrailingData,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            read_chunk: 8 * 1024,
            max_frame_bytes: Some(16 * 1024 * 1024),
            trailing_data: TrailingData::Ignore,
        }
    }
}

/// Receives decoded messages, one call per frame, in stream order.
///
/// The sink runs on the monitor's task: while it runs nothing is read. A sink
/// that blocks stalls the stream.
pub trait MessageSink<M> {
    /// Handle one message.
    fn deliver(&mut self, message: M);

    /// Whether the sink can no longer accept messages.
    ///
    /// Checked before every dispatch; once it returns `true` the monitor stops
    /// with [`MonitorOutcome::Cancelled`]. A monitor blocked on an idle body
    /// only notices at the next frame, so callers that need a prompt stop
    /// still cancel the token.
    fn is_closed(&self) -> bool {
        false
    }
}

impl<M, F> MessageSink<M> for F
where
    F: FnMut(M),
{
    fn deliver(&mut self, message: M) {
        self(message)
    }
}

/// A sink that forwards messages onto an unbounded channel.
///
/// Once the receiver is dropped the sink reports itself closed and the
/// monitor stops before the next dispatch.
#[derive(Debug)]
pub struct ChannelSink<M> {
    tx: mpsc::UnboundedSender<M>,
}

impl<M> ChannelSink<M> {
    /// Wrap a channel sender.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<M>) -> Self {
        Self { tx }
    }
}

impl<M> MessageSink<M> for ChannelSink<M> {
    fn deliver(&mut self, message: M) {
        if self.tx.send(message).is_err() {
            #[cfg(feature = "tracing")]
            tracing::debug!("channel sink receiver dropped");
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Adapts a sink of [`StreamMessage`] so it can receive any message type that
/// converts into one.
///
/// Lets a single consumer follow pulls and the event feed together.
#[derive(Debug)]
pub struct UnifiedSink<S> {
    inner: S,
}

impl<S> UnifiedSink<S> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Unwrap the inner sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<M, S> MessageSink<M> for UnifiedSink<S>
where
    M: Into<StreamMessage>,
    S: MessageSink<StreamMessage>,
{
    fn deliver(&mut self, message: M) {
        self.inner.deliver(message.into());
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Monitor `body`, delivering each decoded message to `sink`.
pub async fn monitor<M, R, S>(body: R, sink: S, cancel: &CancelToken) -> Result<MonitorOutcome>
where
    M: DeserializeOwned,
    R: AsyncRead + Unpin,
    S: MessageSink<M>,
{
    run::<M, _, _>(body, sink, cancel, &MonitorOptions::default()).await
}

/// [`monitor`] with explicit options.
pub async fn monitor_with_options<M, R, S>(
    body: R,
    sink: S,
    cancel: &CancelToken,
    options: &MonitorOptions,
) -> Result<MonitorOutcome>
where
    M: DeserializeOwned,
    R: AsyncRead + Unpin,
    S: MessageSink<M>,
{
    run::<M, _, _>(body, sink, cancel, options).await
}

/// Monitor an image pull/push/import body.
pub async fn monitor_progress<R, S>(body: R, sink: S, cancel: &CancelToken) -> Result<MonitorOutcome>
where
    R: AsyncRead + Unpin,
    S: MessageSink<ProgressMessage>,
{
    monitor::<ProgressMessage, _, _>(body, sink, cancel).await
}

/// Monitor an engine event body.
pub async fn monitor_events<R, S>(body: R, sink: S, cancel: &CancelToken) -> Result<MonitorOutcome>
where
    R: AsyncRead + Unpin,
    S: MessageSink<EventMessage>,
{
    monitor::<EventMessage, _, _>(body, sink, cancel).await
}

async fn run<M, R, S>(
    mut body: R,
    mut sink: S,
    cancel: &CancelToken,
    options: &MonitorOptions,
) -> Result<MonitorOutcome>
where
    M: DeserializeOwned,
    R: AsyncRead + Unpin,
    S: MessageSink<M>,
{
    let mut decoder = FrameDecoder::new();
    let mut dispatched: usize = 0;
    let read_chunk = options.read_chunk.max(1);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        message = std::any::type_name::<M>(),
        read_chunk = read_chunk,
        "monitor started"
    );

    loop {
        // Dispatch every frame that is already complete.
        loop {
            if cancel.is_cancelled() {
                return Ok(cancelled(dispatched));
            }

            let frame = match decoder.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => return Err(Error::malformed(dispatched, e.to_string())),
            };

            let message = decode_frame::<M>(frame).map_err(|e| Error::malformed(dispatched, e))?;

            if sink.is_closed() {
                #[cfg(feature = "tracing")]
                tracing::debug!(dispatched = dispatched, "sink closed; stopping monitor");
                return Ok(MonitorOutcome::Cancelled);
            }

            #[cfg(feature = "tracing")]
            tracing::trace!(index = dispatched, "dispatching frame");

            sink.deliver(message);
            dispatched = dispatched.saturating_add(1);
        }

        if let Some(limit) = options.max_frame_bytes {
            if decoder.pending() > limit {
                return Err(Error::malformed(
                    dispatched,
                    format!(
                        "frame exceeds {limit} bytes ({} buffered)",
                        decoder.pending()
                    ),
                ));
            }
        }

        decoder.reserve(read_chunk);

        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(cancelled(dispatched)),
            read = body.read_buf(decoder.buffer_mut()) => read,
        };

        let n = read.map_err(Error::from)?;
        if n == 0 {
            return finish(&decoder, dispatched, options.trailing_data);
        }
    }
}

fn cancelled(dispatched: usize) -> MonitorOutcome {
    #[cfg(feature = "tracing")]
    tracing::debug!(dispatched = dispatched, "monitor cancelled");
    #[cfg(not(feature = "tracing"))]
    let _ = dispatched;

    MonitorOutcome::Cancelled
}

fn finish(
    decoder: &FrameDecoder,
    dispatched: usize,
    trailing: TrailingData,
) -> Result<MonitorOutcome> {
    if decoder.has_partial() {
        match trailing {
            TrailingData::Reject => {
                return Err(Error::malformed(
                    dispatched,
                    format!(
                        "stream ended inside a frame ({} bytes pending)",
                        decoder.pending()
                    ),
                ));
            }
            TrailingData::Ignore => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    pending = decoder.pending(),
                    "stream ended inside a frame; dropping partial data"
                );
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(dispatched = dispatched, "monitor completed");

    Ok(MonitorOutcome::Completed)
}

/// Builder-style monitor for callers that assemble the body and sink
/// separately.
///
/// [`run`](StreamMonitor::run) fails with [`Error::InvalidArgument`] before
/// touching the body if either the body or the sink is missing.
pub struct StreamMonitor<M> {
    body: Option<ResponseBody>,
    sink: Option<Box<dyn MessageSink<M> + Send>>,
    cancel: CancelToken,
    options: MonitorOptions,
    _message: PhantomData<fn() -> M>,
}

impl<M: DeserializeOwned> StreamMonitor<M> {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> Self {
        Self {
            body: None,
            sink: None,
            cancel: CancelToken::new(),
            options: MonitorOptions::default(),
            _message: PhantomData,
        }
    }

    /// Response body to consume.
    #[must_use]
    pub fn body(mut self, body: ResponseBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Message sink.
    #[must_use]
    pub fn sink(mut self, sink: impl MessageSink<M> + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Cancellation token. Defaults to one that is never cancelled.
    #[must_use]
    pub fn cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Monitor options.
    #[must_use]
    pub fn options(mut self, options: MonitorOptions) -> Self {
        self.options = options;
        self
    }

    /// Run to completion.
    pub async fn run(self) -> Result<MonitorOutcome> {
        let body = self.body.ok_or(Error::InvalidArgument { name: "body" })?;
        let sink = self.sink.ok_or(Error::InvalidArgument { name: "sink" })?;
        run::<M, _, _>(body, BoxedSink(sink), &self.cancel, &self.options).await
    }
}

impl<M> fmt::Debug for StreamMonitor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamMonitor")
            .field("body", &self.body.is_some())
            .field("sink", &self.sink.is_some())
            .field("cancel", &self.cancel)
            .field("options", &self.options)
            .finish()
    }
}

struct BoxedSink<M>(Box<dyn MessageSink<M> + Send>);

impl<M> MessageSink<M> for BoxedSink<M> {
    fn deliver(&mut self, message: M) {
        self.0.deliver(message)
    }

    fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}
