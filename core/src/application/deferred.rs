//! Bookkeeping for scheduled work (settle delays, display timeouts, force stages).

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Shared {
    outstanding: AtomicUsize,
    idle: Notify,
}

/// Spawns detached tasks and lets the event loop wait until none are left.
///
/// Cheap to clone; clones count into the same set.
#[derive(Debug, Clone, Default)]
pub struct DeferredTasks {
    shared: Arc<Shared>,
}

/// Decrements the count when the task finishes or is aborted.
struct Completion(Arc<Shared>);

impl Drop for Completion {
    fn drop(&mut self) {
        if self.0.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl DeferredTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` on the current runtime.
    ///
    /// The count is raised before this returns, so work scheduled from inside
    /// another deferred task never lets the set look idle in between.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.shared.outstanding.fetch_add(1, Ordering::AcqRel);
        let completion = Completion(Arc::clone(&self.shared));
        tokio::spawn(async move {
            let _completion = completion;
            task.await;
        });
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::Acquire)
    }

    /// Resolves once no spawned task is left.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}
