//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod event;
mod policy;
mod process;

// Re-export all domain types
pub use event::{DisplayChange, DisplayId, DisplayInfo, LockState, SystemEvent};
pub use policy::{
    SignalKind, TerminationPolicy, TerminationPolicyBuilder, TriggerEvent,
    DEFAULT_DISPLAY_TIMEOUT, DEFAULT_PROCESS_NAME, DEFAULT_SETTLE_DELAY,
};
pub use process::{select_targets, ProcessRecord};
