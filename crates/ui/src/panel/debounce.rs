//! Coalesces bursts of stream items into one item per quiet period.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::{Instant, Sleep, sleep};

/// Yields the latest item once `quiet` has passed without a newer one.
///
/// When the inner stream ends, a pending item is still delivered after its
/// quiet period.
pub struct Debounce<S: Stream> {
    inner: Option<S>,
    quiet: Duration,
    pending: Option<S::Item>,
    deadline: Pin<Box<Sleep>>,
}

// Items are only moved, never pinned.
impl<S: Stream + Unpin> Unpin for Debounce<S> {}

impl<S: Stream + Unpin> Debounce<S> {
    pub fn new(inner: S, quiet: Duration) -> Self {
        Self {
            inner: Some(inner),
            quiet,
            pending: None,
            deadline: Box::pin(sleep(quiet)),
        }
    }
}

impl<S: Stream + Unpin> Stream for Debounce<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        while let Some(inner) = this.inner.as_mut() {
            match inner.poll_next_unpin(cx) {
                Poll::Ready(Some(item)) => {
                    this.pending = Some(item);
                    this.deadline.as_mut().reset(Instant::now() + this.quiet);
                }
                Poll::Ready(None) => this.inner = None,
                Poll::Pending => break,
            }
        }

        if this.pending.is_none() {
            return if this.inner.is_none() {
                Poll::Ready(None)
            } else {
                Poll::Pending
            };
        }

        match this.deadline.as_mut().poll(cx) {
            Poll::Ready(()) => Poll::Ready(this.pending.take()),
            Poll::Pending => Poll::Pending,
        }
    }
}

pub trait DebounceExt: Stream + Sized + Unpin {
    fn debounce(self, quiet: Duration) -> Debounce<Self> {
        Debounce::new(self, quiet)
    }
}

impl<S: Stream + Unpin> DebounceExt for S {}
