use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Handle to the reply of a dispatched call
///
/// Either completed up front (local short-circuit results and captured
/// dispatch errors) or backed by a oneshot channel the transport layer
/// completes when the wire response arrives. Awaiting the future yields
/// the captured result either way.
pub struct ResponseFuture<T> {
    state: State<T>,
    cancelled: bool,
}

enum State<T> {
    Done(Option<Result<T>>),
    Pending(oneshot::Receiver<Result<T>>),
}

impl<T> ResponseFuture<T> {
    /// Already-completed future resolving to `value`
    pub fn ready(value: T) -> Self {
        Self {
            state: State::Done(Some(Ok(value))),
            cancelled: false,
        }
    }

    /// Already-completed future that fails with `error` when awaited
    pub fn failed(error: Error) -> Self {
        Self {
            state: State::Done(Some(Err(error))),
            cancelled: false,
        }
    }

    /// In-flight pair: the transport keeps the sender and completes it when
    /// the wire response arrives, the caller awaits the future
    pub fn pending() -> (ResponseSender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            ResponseSender { tx },
            Self {
                state: State::Pending(rx),
                cancelled: false,
            },
        )
    }

    /// Whether the response is already settled
    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done(_))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Attempt to cancel the wait
    ///
    /// Completed responses are not cancellable and report `false`; for an
    /// in-flight response the underlying channel is closed and any late
    /// completion by the transport is discarded.
    pub fn cancel(&mut self) -> bool {
        match &mut self.state {
            State::Done(_) => false,
            State::Pending(rx) => {
                rx.close();
                self.cancelled = true;
                true
            }
        }
    }

    /// Await the response with an upper bound on the wait
    pub async fn wait_timeout(self, duration: Duration) -> Result<T> {
        tokio::time::timeout(duration, self)
            .await
            .map_err(|_| Error::Custom("response timeout exceeded".to_string()))?
    }
}

// No self-referential state; the future can be moved freely between polls.
impl<T> Unpin for ResponseFuture<T> {}

impl<T> Future for ResponseFuture<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            State::Done(slot) => Poll::Ready(slot.take().unwrap_or_else(|| {
                Err(Error::Custom(
                    "response future polled after completion".to_string(),
                ))
            })),
            State::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(_)) => Poll::Ready(Err(Error::ResponseDropped)),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

/// Transport-side handle used to complete a pending [`ResponseFuture`]
pub struct ResponseSender<T> {
    tx: oneshot::Sender<Result<T>>,
}

impl<T> ResponseSender<T> {
    /// Resolve the future with a value; returns `false` when the receiver
    /// is already gone
    pub fn complete(self, value: T) -> bool {
        self.tx.send(Ok(value)).is_ok()
    }

    /// Resolve the future with an error
    pub fn fail(self, error: Error) -> bool {
        self.tx.send(Err(error)).is_ok()
    }
}
