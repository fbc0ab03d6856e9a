//! Trigger arbitration: decides when a lock-state event turns into exactly one escalation.
//!
//! In display-wait mode, a trigger that finds no external display arms a
//! [`PendingKillIntent`] and a timeout. Whichever of the display-attach path
//! and the timeout path takes the intent first runs the escalation; the other
//! sees it already cleared and does nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::domain::{DisplayChange, LockState, TerminationPolicy};
use crate::ports::{DisplayTopology, Terminate};

use super::deferred::DeferredTasks;
use super::escalation::EscalationController;

/// Observable arbiter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    Idle,
    AwaitingDisplayConfirmation,
}

/// Single-flight "a trigger is waiting for a display" flag.
///
/// The flag shares one atomic word with a cycle number (`cycle << 1 | pending`).
/// It is only ever cleared by a single atomic operation on that word, so two
/// racing consumers can never both observe it set, and a consumer holding a
/// stale cycle number can never clear a newer cycle's flag.
#[derive(Debug, Default)]
pub struct PendingKillIntent {
    state: AtomicU64,
}

const PENDING: u64 = 1;

impl PendingKillIntent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns the new cycle number, or `None` if a cycle
    /// was already pending.
    pub fn arm(&self) -> Option<u64> {
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                (state & PENDING == 0).then(|| (((state >> 1) + 1) << 1) | PENDING)
            })
            .ok()?;
        Some((previous >> 1) + 1)
    }

    /// Atomically read and clear the flag.
    pub fn take(&self) -> bool {
        self.state.fetch_and(!PENDING, Ordering::AcqRel) & PENDING != 0
    }

    /// Like [`take`](Self::take), but only for the given cycle. Timeouts
    /// armed by an earlier, already-consumed cycle must not steal a newer one.
    pub fn take_cycle(&self, cycle: u64) -> bool {
        self.state
            .compare_exchange(
                (cycle << 1) | PENDING,
                cycle << 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) & PENDING != 0
    }
}

struct Inner<T, D> {
    escalation: EscalationController<T>,
    displays: D,
    intent: PendingKillIntent,
}

impl<T: Terminate, D: DisplayTopology> Inner<T, D> {
    fn policy(&self) -> &TerminationPolicy {
        self.escalation.policy()
    }

    async fn on_timeout(&self, cycle: u64) {
        if self.intent.take_cycle(cycle) {
            info!("Timeout reached, killing targets");
            self.escalation.escalate().await;
        } else {
            debug!(cycle = cycle, "Timeout fired after the intent was consumed");
        }
    }
}

/// Turns lock-state and display events into escalations, at most one per cycle.
///
/// Cheap to clone; clones share the same pending intent.
pub struct TriggerArbiter<T, D> {
    inner: Arc<Inner<T, D>>,
}

impl<T, D> Clone for TriggerArbiter<T, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Terminate, D: DisplayTopology> TriggerArbiter<T, D> {
    pub fn new(policy: Arc<TerminationPolicy>, terminator: Arc<T>, displays: D) -> Self {
        Self {
            inner: Arc::new(Inner {
                escalation: EscalationController::new(terminator, policy),
                displays,
                intent: PendingKillIntent::new(),
            }),
        }
    }

    pub fn policy(&self) -> &TerminationPolicy {
        self.inner.policy()
    }

    /// Settle delays, display timeouts and force stages still scheduled.
    pub fn tasks(&self) -> &DeferredTasks {
        self.inner.escalation.tasks()
    }

    pub fn state(&self) -> ArbiterState {
        if self.inner.intent.is_pending() {
            ArbiterState::AwaitingDisplayConfirmation
        } else {
            ArbiterState::Idle
        }
    }

    /// Handle a lock-state notification.
    ///
    /// Without display-wait the primary stage runs before this returns.
    pub async fn on_lock_event(&self, state: LockState) {
        let policy = self.inner.policy();
        if !policy.trigger.matches(state) {
            debug!(event = %state, "Ignoring event of the other polarity");
            return;
        }
        info!(event = %state, "{} detected", state);

        if !policy.wait_for_displays {
            self.inner.escalation.escalate().await;
            return;
        }

        // A cycle already waiting on displays absorbs the trigger, whatever the
        // topology looks like now; its display event or timeout still fires once.
        if self.inner.intent.is_pending() {
            debug!("Already waiting for external displays; coalescing trigger");
            return;
        }

        if self.inner.displays.has_external_display() {
            let delay = policy.settle_delay;
            info!(delay = ?delay, "External displays already online, using settle delay");
            let inner = Arc::clone(&self.inner);
            self.inner.escalation.tasks().spawn(async move {
                sleep(delay).await;
                info!("Settle delay complete, killing targets");
                inner.escalation.escalate().await;
            });
            return;
        }

        let Some(cycle) = self.inner.intent.arm() else {
            debug!("Already waiting for external displays; coalescing trigger");
            return;
        };

        let timeout = policy.display_timeout;
        info!(timeout = ?timeout, "Waiting for external displays to enable");
        let inner = Arc::clone(&self.inner);
        self.inner.escalation.tasks().spawn(async move {
            sleep(timeout).await;
            inner.on_timeout(cycle).await;
        });
    }

    /// Handle a display reconfiguration notification.
    ///
    /// The topology records the change first, so a trigger dispatched later
    /// sees it and one dispatched earlier did not.
    pub async fn on_display_event(&self, change: DisplayChange) {
        self.inner.displays.observe(&change);

        if !change.is_external_attach() {
            debug!(
                display = change.id,
                enabled = change.enabled,
                builtin = change.builtin,
                "Ignoring display change"
            );
            return;
        }

        if self.inner.intent.take() {
            info!(display = change.id, "External display enabled, killing targets now");
            self.inner.escalation.escalate().await;
        } else {
            debug!(display = change.id, "External display enabled with no pending kill");
        }
    }
}
