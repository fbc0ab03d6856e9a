//! LockKiller Core Library
//!
//! Terminates a configured set of named processes when the screen is
//! unlocked (or locked). Provides functionality to:
//! - Resolve processes by exact image name and signal them
//! - Escalate from a graceful to a forced signal after a grace period
//! - Defer the kill until external displays have attached, with a timeout
//! - Run a single-threaded event loop over pluggable event sources
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - macOS: Uses `ps` for process enumeration; events via the line protocol
//! - Linux: Uses procfs, `dbus-monitor` for screensaver signals and sysfs DRM
//!   connectors for display topology

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    DisplayChange, DisplayId, DisplayInfo, LockState, ProcessRecord, SignalKind, SystemEvent,
    TerminationPolicy, TerminationPolicyBuilder, TriggerEvent,
};

// Re-export other commonly used types
pub use application::{
    ArbiterState, Daemon, DeferredTasks, EscalationController, EscalationOutcome,
    PendingKillIntent, ProcessTerminator, RunningDaemon, ShutdownReason, TriggerArbiter,
};
pub use error::{Error, Result};
