//! Process terminator port (interface).

use std::collections::BTreeSet;

use crate::domain::SignalKind;

/// Port for terminating processes by name.
///
/// The escalation stage only depends on this trait, so it can be driven
/// against a recording double in tests.
pub trait Terminate: Send + Sync + 'static {
    /// Signal every live process whose image name is in `names`.
    ///
    /// Returns `true` if at least one process was signaled. Never fails:
    /// enumeration and delivery errors count as "not signaled".
    fn terminate(
        &self,
        names: &BTreeSet<String>,
        signal: SignalKind,
    ) -> impl std::future::Future<Output = bool> + Send;
}
