use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use futures::future::{self, BoxFuture, FutureExt};
use tokio::{
    sync::Notify,
    time::{sleep_until, Instant},
};

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    cancel_signal: Notify,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

/// A cancellation signal with an optional deadline.
///
/// Clones share the same signal. A child context is done as soon as its
/// parent is, while cancelling a child leaves the parent untouched.
#[derive(Clone, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// A root context that is only done when cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(Inner {
                parent: Some(self.clone()),
                ..Inner::default()
            }),
        }
    }

    /// A child context that is also done once `timeout` has elapsed.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                deadline: Some(Instant::now() + timeout),
                parent: Some(self.clone()),
                ..Inner::default()
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.cancel_signal.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
            || self
                .inner
                .deadline
                .map_or(false, |deadline| Instant::now() >= deadline)
            || self
                .inner
                .parent
                .as_ref()
                .map_or(false, Context::is_cancelled)
    }

    /// Resolves once this context is cancelled, times out, or its parent does.
    pub fn cancelled(&self) -> BoxFuture<'_, ()> {
        async move {
            let own = async {
                loop {
                    let notified = self.inner.cancel_signal.notified();
                    tokio::pin!(notified);
                    // register before checking the flag so a concurrent cancel is not missed
                    notified.as_mut().enable();
                    if self.inner.cancelled.load(Ordering::SeqCst) {
                        return;
                    }
                    notified.await;
                }
            };
            let deadline = async {
                match self.inner.deadline {
                    Some(deadline) => sleep_until(deadline).await,
                    None => future::pending().await,
                }
            };
            let parent = async {
                match &self.inner.parent {
                    Some(parent) => parent.cancelled().await,
                    None => future::pending().await,
                }
            };

            tokio::select! {
                _ = own => {}
                _ = deadline => {}
                _ = parent => {}
            }
        }
        .boxed()
    }

    /// Drives `fut` unless this context is done first, in which case `None`.
    pub(crate) async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }
}
