//! Error types for the lockkiller-core library.

use thiserror::Error;

use crate::domain::SignalKind;

/// Result type alias for lockkiller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while wiring up or running the daemon.
///
/// Only [`Error::Configuration`] and [`Error::Subscription`] are fatal. Everything
/// raised on the event-handling path is logged and swallowed so the daemon keeps running.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid user-supplied settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Could not attach to an OS event source.
    #[error("Failed to subscribe to event source: {0}")]
    Subscription(String),

    /// Could not list running processes.
    #[error("Failed to enumerate processes: {0}")]
    Enumeration(String),

    /// A signal could not be delivered to one process.
    #[error("Failed to send {signal} to PID {pid}: {reason}")]
    Delivery {
        pid: u32,
        signal: SignalKind,
        reason: String,
    },

    /// Malformed line on an event stream.
    #[error("Failed to parse event: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error should terminate the daemon.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Subscription(_))
    }
}
