//! Events delivered by the OS event sources.

use std::fmt;

/// Screen lock state reported by the lock-state event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockState {
    Locked,
    Unlocked,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockState::Locked => f.write_str("lock"),
            LockState::Unlocked => f.write_str("unlock"),
        }
    }
}

/// Opaque display identifier.
pub type DisplayId = u32;

/// A display as reported by a topology query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    pub id: DisplayId,
    /// Built into the machine (laptop panel) rather than externally attached.
    pub builtin: bool,
}

impl DisplayInfo {
    pub fn external(id: DisplayId) -> Self {
        Self { id, builtin: false }
    }

    pub fn builtin(id: DisplayId) -> Self {
        Self { id, builtin: true }
    }
}

/// A display reconfiguration notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayChange {
    pub id: DisplayId,
    /// True when the display became enabled, false when it was disabled.
    pub enabled: bool,
    pub builtin: bool,
}

impl DisplayChange {
    /// An external display finished attaching.
    pub fn is_external_attach(&self) -> bool {
        self.enabled && !self.builtin
    }
}

/// Everything the daemon's event loop dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    Lock(LockState),
    Display(DisplayChange),
}
