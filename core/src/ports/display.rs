//! Display topology port (interface).

use crate::domain::{DisplayChange, DisplayInfo};

/// Port for querying the currently active displays.
pub trait DisplayTopology: Send + Sync + 'static {
    /// List the active displays with their built-in flag.
    fn active_displays(&self) -> Vec<DisplayInfo>;

    /// Whether any externally attached display is active right now.
    fn has_external_display(&self) -> bool {
        self.active_displays().iter().any(|d| !d.builtin)
    }

    /// Called for every display change the daemon dispatches, before the
    /// arbiter acts on it. Topologies that read live hardware state ignore it.
    fn observe(&self, _change: &DisplayChange) {}
}

impl<T: DisplayTopology> DisplayTopology for std::sync::Arc<T> {
    fn active_displays(&self) -> Vec<DisplayInfo> {
        (**self).active_displays()
    }

    fn observe(&self, change: &DisplayChange) {
        (**self).observe(change)
    }
}

impl DisplayTopology for Box<dyn DisplayTopology> {
    fn active_displays(&self) -> Vec<DisplayInfo> {
        (**self).active_displays()
    }

    fn observe(&self, change: &DisplayChange) {
        (**self).observe(change)
    }
}
