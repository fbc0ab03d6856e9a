//! Display topology reconstructed from observed display events.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::domain::{DisplayChange, DisplayId, DisplayInfo};
use crate::ports::DisplayTopology;

/// Topology built from the display notifications an event source has seen.
///
/// Used when the platform has no queryable topology of its own and display
/// changes arrive on the same stream as lock events. Changes are recorded as
/// the daemon dispatches them, so a trigger never sees a display that was
/// announced after it.
#[derive(Debug, Default)]
pub struct TrackedDisplays {
    displays: RwLock<BTreeMap<DisplayId, DisplayInfo>>,
}

impl TrackedDisplays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reconfiguration.
    pub fn apply(&self, change: &DisplayChange) {
        let mut displays = self.displays.write();
        if change.enabled {
            displays.insert(
                change.id,
                DisplayInfo {
                    id: change.id,
                    builtin: change.builtin,
                },
            );
        } else {
            displays.remove(&change.id);
        }
    }
}

impl DisplayTopology for TrackedDisplays {
    fn active_displays(&self) -> Vec<DisplayInfo> {
        self.displays.read().values().cloned().collect()
    }

    fn observe(&self, change: &DisplayChange) {
        self.apply(change);
    }
}
