//! Termination policy domain model.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Process targeted when no `--process` is given.
pub const DEFAULT_PROCESS_NAME: &str = "WallpaperAerialsExtension";

/// Wait applied when an external display already reports attached at trigger time.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Fallback wait for a display-attach event.
pub const DEFAULT_DISPLAY_TIMEOUT: Duration = Duration::from_millis(5000);

// ============================================================================
// SignalKind
// ============================================================================

/// Signal delivered to matched processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Polite request to exit (SIGTERM).
    Terminate,
    /// Immediate termination (SIGKILL).
    Kill,
}

impl SignalKind {
    /// Conventional signal name.
    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::Terminate => "SIGTERM",
            SignalKind::Kill => "SIGKILL",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignalKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TERM" | "SIGTERM" => Ok(SignalKind::Terminate),
            "KILL" | "SIGKILL" => Ok(SignalKind::Kill),
            _ => Err(Error::Configuration(format!("Invalid signal value: {}", s))),
        }
    }
}

// ============================================================================
// TriggerEvent
// ============================================================================

/// Lock-state transition that starts a termination cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriggerEvent {
    #[default]
    OnUnlock,
    OnLock,
}

impl TriggerEvent {
    /// Whether a lock-state notification matches this trigger polarity.
    pub fn matches(&self, state: super::LockState) -> bool {
        matches!(
            (*self, state),
            (TriggerEvent::OnUnlock, super::LockState::Unlocked)
                | (TriggerEvent::OnLock, super::LockState::Locked)
        )
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::OnUnlock => f.write_str("unlock"),
            TriggerEvent::OnLock => f.write_str("lock"),
        }
    }
}

impl FromStr for TriggerEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unlock" => Ok(TriggerEvent::OnUnlock),
            "lock" => Ok(TriggerEvent::OnLock),
            _ => Err(Error::Configuration(format!("Invalid event value: {}", s))),
        }
    }
}

// ============================================================================
// TerminationPolicy
// ============================================================================

/// Immutable settings shared by every component for the lifetime of the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationPolicy {
    names: BTreeSet<String>,
    pub primary_signal: SignalKind,
    pub force_signal: SignalKind,
    /// Zero disables the force stage.
    pub grace_period: Duration,
    pub trigger: TriggerEvent,
    pub wait_for_displays: bool,
    pub display_timeout: Duration,
    pub settle_delay: Duration,
}

impl TerminationPolicy {
    /// Start building a policy with the defaults.
    pub fn builder() -> TerminationPolicyBuilder {
        TerminationPolicyBuilder::default()
    }

    /// Target process names. Never empty.
    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// Whether the force stage is enabled at all.
    pub fn escalates(&self) -> bool {
        !self.grace_period.is_zero()
    }
}

/// Builder for [`TerminationPolicy`].
#[derive(Debug, Clone)]
pub struct TerminationPolicyBuilder {
    names: Vec<String>,
    primary_signal: SignalKind,
    force_signal: SignalKind,
    grace_period: Duration,
    trigger: TriggerEvent,
    wait_for_displays: bool,
    display_timeout: Duration,
    settle_delay: Duration,
}

impl Default for TerminationPolicyBuilder {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            primary_signal: SignalKind::Terminate,
            force_signal: SignalKind::Kill,
            grace_period: Duration::ZERO,
            trigger: TriggerEvent::OnUnlock,
            wait_for_displays: false,
            display_timeout: DEFAULT_DISPLAY_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl TerminationPolicyBuilder {
    /// Add a target process name. Without any, the default target is used.
    pub fn process(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn processes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn primary_signal(mut self, signal: SignalKind) -> Self {
        self.primary_signal = signal;
        self
    }

    pub fn force_signal(mut self, signal: SignalKind) -> Self {
        self.force_signal = signal;
        self
    }

    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    pub fn trigger(mut self, trigger: TriggerEvent) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn wait_for_displays(mut self, enabled: bool) -> Self {
        self.wait_for_displays = enabled;
        self
    }

    pub fn display_timeout(mut self, timeout: Duration) -> Self {
        self.display_timeout = timeout;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Validate and freeze the policy.
    pub fn build(self) -> Result<TerminationPolicy> {
        if let Some(blank) = self.names.iter().find(|n| n.trim().is_empty()) {
            return Err(Error::Configuration(format!(
                "Invalid process name: {:?}",
                blank
            )));
        }

        let mut names: BTreeSet<String> = self.names.into_iter().collect();
        if names.is_empty() {
            names.insert(DEFAULT_PROCESS_NAME.to_string());
        }

        Ok(TerminationPolicy {
            names,
            primary_signal: self.primary_signal,
            force_signal: self.force_signal,
            grace_period: self.grace_period,
            trigger: self.trigger,
            wait_for_displays: self.wait_for_displays,
            display_timeout: self.display_timeout,
            settle_delay: self.settle_delay,
        })
    }
}
