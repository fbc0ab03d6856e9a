//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs
//!
//! Call chain: [`Daemon`] dispatches events to the [`TriggerArbiter`], which
//! runs at most one [`EscalationController::escalate`] per trigger cycle, which
//! in turn calls the [`ProcessTerminator`] once or twice. Delayed work runs on
//! [`DeferredTasks`] so the daemon can let it finish before exiting.

mod arbiter;
mod daemon;
mod deferred;
mod escalation;
mod terminator;

#[cfg(test)]
pub(crate) mod testing;

pub use arbiter::{ArbiterState, PendingKillIntent, TriggerArbiter};
pub use daemon::{Daemon, RunningDaemon, ShutdownReason};
pub use deferred::DeferredTasks;
pub use escalation::{EscalationController, EscalationOutcome};
pub use terminator::ProcessTerminator;
