//! Event loop tying event sources to the trigger arbiter.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::domain::SystemEvent;
use crate::error::Result;
use crate::ports::{DisplayTopology, EventSource, Subscription, Terminate};

use super::arbiter::TriggerArbiter;

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The shutdown future completed (Ctrl-C, SIGTERM).
    Requested,
    /// Every event source closed its stream.
    SourcesClosed,
}

/// Collects event sources and dispatches their events to a [`TriggerArbiter`].
pub struct Daemon<T, D> {
    arbiter: TriggerArbiter<T, D>,
    sources: Vec<Box<dyn EventSource>>,
}

impl<T: Terminate, D: DisplayTopology> Daemon<T, D> {
    pub fn new(arbiter: TriggerArbiter<T, D>) -> Self {
        Self {
            arbiter,
            sources: Vec::new(),
        }
    }

    /// Add an event source.
    pub fn with_source(mut self, source: Box<dyn EventSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Attach every source to a shared queue.
    ///
    /// Fails with the first [`crate::Error::Subscription`]; already started
    /// sources are stopped again.
    pub fn subscribe(self) -> Result<RunningDaemon<T, D>> {
        let (tx, events) = mpsc::unbounded_channel();

        let mut subscriptions = Vec::with_capacity(self.sources.len());
        for source in self.sources {
            let name = source.name();
            let subscription = source.subscribe(tx.clone())?;
            debug!(source = name, "Event source subscribed");
            subscriptions.push(subscription);
        }

        Ok(RunningDaemon {
            arbiter: self.arbiter,
            events,
            subscriptions,
        })
    }
}

/// A daemon whose sources are attached and delivering events.
pub struct RunningDaemon<T, D> {
    arbiter: TriggerArbiter<T, D>,
    events: UnboundedReceiver<SystemEvent>,
    subscriptions: Vec<Subscription>,
}

impl<T: Terminate, D: DisplayTopology> RunningDaemon<T, D> {
    pub fn arbiter(&self) -> &TriggerArbiter<T, D> {
        &self.arbiter
    }

    /// Dispatch events in arrival order until `shutdown` completes or all sources close.
    ///
    /// After the last source closes, scheduled settle delays, display timeouts
    /// and force stages still run to completion (unless `shutdown` fires first).
    pub async fn run_until<F>(mut self, shutdown: F) -> ShutdownReason
    where
        F: Future<Output = ()>,
    {
        let policy = self.arbiter.policy();
        info!(
            event = %policy.trigger,
            wait_for_displays = policy.wait_for_displays,
            sources = ?self.subscriptions.iter().map(Subscription::source).collect::<Vec<_>>(),
            "Listening for {} events",
            policy.trigger
        );

        tokio::pin!(shutdown);
        let reason = loop {
            tokio::select! {
                _ = &mut shutdown => break ShutdownReason::Requested,
                event = self.events.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => {
                        warn!("All event sources closed");
                        break self.drain(&mut shutdown).await;
                    }
                },
            }
        };

        info!(reason = ?reason, "Event loop stopped");
        reason
    }

    async fn drain<F>(&self, shutdown: &mut Pin<&mut F>) -> ShutdownReason
    where
        F: Future<Output = ()>,
    {
        let tasks = self.arbiter.tasks();
        let outstanding = tasks.outstanding();
        if outstanding == 0 {
            return ShutdownReason::SourcesClosed;
        }

        info!(outstanding, "Waiting for scheduled kills before exiting");
        tokio::select! {
            _ = shutdown.as_mut() => ShutdownReason::Requested,
            _ = tasks.wait_idle() => ShutdownReason::SourcesClosed,
        }
    }

    async fn dispatch(&self, event: SystemEvent) {
        match event {
            SystemEvent::Lock(state) => self.arbiter.on_lock_event(state).await,
            SystemEvent::Display(change) => self.arbiter.on_display_event(change).await,
        }
    }
}
