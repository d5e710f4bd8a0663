//! Tracked detached tasks.
//!
//! Fire-and-forget work (e.g. a tracking write issued after an HTTP redirect)
//! must not outlive process shutdown silently. `TaskDrain` counts in-flight
//! detached tasks so shutdown can await them with a bounded timeout.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

#[derive(Clone, Default)]
pub struct TaskDrain {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    active: AtomicUsize,
    done: Notify,
}

impl TaskDrain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of detached tasks currently in flight.
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Spawn `fut` as a tracked detached task. The task is never joined to a
    /// request lifecycle; completion is only observed by [`TaskDrain::drain`].
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            fut.await;
            if inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
                inner.done.notify_waiters();
            }
        });
    }

    /// Wait until all tracked tasks have finished, up to `timeout`.
    /// Logs a warning if the timeout expires with tasks still in flight.
    pub async fn drain(&self, timeout: Duration) {
        let wait = async {
            loop {
                let notified = self.inner.done.notified();
                if self.inner.active.load(Ordering::SeqCst) == 0 {
                    return;
                }
                notified.await;
            }
        };
        if tokio::time::timeout(timeout, wait).await.is_err() {
            tracing::warn!(
                remaining = self.active(),
                "drain timeout expired with detached tasks still in flight"
            );
        }
    }
}
