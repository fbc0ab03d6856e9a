//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`.

mod display;
mod events;
mod process;
mod terminator;

pub use display::DisplayTopology;
pub use events::{EventSource, Subscription};
pub use process::{ProcessTable, SignalSender};
pub use terminator::Terminate;
