//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

pub mod display;
pub mod events;
pub mod process;

// Re-export main types for convenience
pub use display::{SysfsDisplayWatcher, SysfsDisplays, TrackedDisplays};
pub use events::{LineEventSource, ScreenSaverMonitor};
pub use process::{NixSignalSender, SystemProcessTable};
