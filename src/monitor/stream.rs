//! Channel-backed monitoring on a background task.

use futures_core::Stream;
use serde::de::DeserializeOwned;
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tokio::{io::AsyncRead, sync::mpsc, task::JoinHandle};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::{ChannelSink, MonitorOptions, MonitorOutcome, run};
use crate::{
    cancel::CancelToken,
    error::{Error, Result},
};

/// Messages decoded by a monitor running on its own task.
///
/// This type implements [`Stream`]; the stream ends when the monitor stops,
/// for whatever reason. Call [`finish`](Self::finish) afterwards to learn why.
/// Dropping it cancels the monitor.
#[derive(Debug)]
pub struct MessageStream<M> {
    inner: UnboundedReceiverStream<M>,
    cancel: CancelToken,
    task: Option<JoinHandle<Result<MonitorOutcome>>>,
}

/// Run a monitor over `body` on a new tokio task.
///
/// Messages are queued on an unbounded channel: the monitor never waits for
/// the consumer, so a consumer that stops polling lets the queue grow without
/// limit. Drop the stream (or [`cancel`](MessageStream::cancel) it) when no
/// longer interested.
///
/// Must be called from within a tokio runtime.
pub fn spawn<M, R>(body: R, options: MonitorOptions) -> MessageStream<M>
where
    M: DeserializeOwned + Send + 'static,
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancelToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        run::<M, _, _>(body, ChannelSink::new(tx), &token, &options).await
    });

    MessageStream {
        inner: UnboundedReceiverStream::new(rx),
        cancel,
        task: Some(task),
    }
}

impl<M> MessageStream<M> {
    /// Receive the next message, or `None` once the monitor has stopped and
    /// every delivered message was received.
    pub async fn recv(&mut self) -> Option<M> {
        use tokio_stream::StreamExt;

        self.inner.next().await
    }

    /// Token controlling the background monitor.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Ask the monitor to stop.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the monitor to stop and return its result.
    ///
    /// Messages not yet received are discarded.
    pub async fn finish(mut self) -> Result<MonitorOutcome> {
        let Some(task) = self.task.take() else {
            return Err(Error::Cancelled);
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Ok(MonitorOutcome::Cancelled),
            Err(e) => Err(Error::StreamFailure {
                source: std::io::Error::other(e),
            }),
        }
    }
}

impl<M> Drop for MessageStream<M> {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel.cancel();
        }
    }
}

impl<M> Stream for MessageStream<M> {
    type Item = M;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
