//! Process domain model.

use std::collections::BTreeSet;

/// A live process as seen by one enumeration pass. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    /// Image name (executable name without its directory).
    pub name: String,
}

impl ProcessRecord {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }

    /// Exact, case-sensitive match against the target set.
    pub fn matches(&self, targets: &BTreeSet<String>) -> bool {
        targets.contains(&self.name)
    }
}

/// Filter records down to the ones whose name is in `targets`, skipping PID 0.
pub fn select_targets<'a>(
    records: &'a [ProcessRecord],
    targets: &'a BTreeSet<String>,
) -> impl Iterator<Item = &'a ProcessRecord> + 'a {
    records
        .iter()
        .filter(move |r| r.pid != 0 && r.matches(targets))
}
