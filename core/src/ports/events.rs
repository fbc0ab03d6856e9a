//! Event source port (interface).

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::domain::SystemEvent;
use crate::error::Result;

/// Port for OS notification sources (lock state, display topology).
///
/// A source pushes its events into the daemon's queue until the returned
/// [`Subscription`] is dropped.
pub trait EventSource: Send {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Start delivering events into `events`.
    ///
    /// Must be called from within a tokio runtime. Returns
    /// [`crate::Error::Subscription`] if the source cannot be attached.
    fn subscribe(self: Box<Self>, events: UnboundedSender<SystemEvent>) -> Result<Subscription>;
}

/// Handle to a running event source. Dropping it stops delivery.
#[derive(Debug)]
pub struct Subscription {
    source: &'static str,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn new(source: &'static str, task: JoinHandle<()>) -> Self {
        Self { source, task }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
