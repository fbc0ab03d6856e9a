//! Process enumeration and signal delivery ports (interfaces).

use crate::domain::{ProcessRecord, SignalKind};
use crate::error::Result;

/// Port for listing live processes.
///
/// Implementations handle platform-specific details (`ps`, procfs, etc.)
pub trait ProcessTable: Send + Sync {
    /// List every live process with its image name.
    ///
    /// Called fresh on each termination attempt; results must not be cached.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<ProcessRecord>>> + Send;
}

/// Port for delivering a signal to one process.
pub trait SignalSender: Send + Sync {
    /// Deliver `signal` to `pid`.
    ///
    /// Returns [`crate::Error::Delivery`] when the process has already exited
    /// or the caller lacks permission.
    fn send(&self, pid: u32, signal: SignalKind) -> Result<()>;
}
