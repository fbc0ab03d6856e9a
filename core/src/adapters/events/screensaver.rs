//! Lock-state events from the freedesktop/GNOME screensaver D-Bus interface.
//!
//! Spawns `dbus-monitor` on the session bus and watches for
//! `ActiveChanged(boolean)` signals: `true` means the screen locked,
//! `false` means it was unlocked.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::domain::{LockState, SystemEvent};
use crate::error::{Error, Result};
use crate::ports::{EventSource, Subscription};

const MATCH_RULES: &[&str] = &[
    "type='signal',interface='org.freedesktop.ScreenSaver',member='ActiveChanged'",
    "type='signal',interface='org.gnome.ScreenSaver',member='ActiveChanged'",
];

/// Incremental parser for `dbus-monitor` output.
#[derive(Debug, Default)]
pub struct ActiveChangedParser {
    in_active_changed: bool,
}

impl ActiveChangedParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one output line; returns a lock state when a signal body completes.
    pub fn feed(&mut self, line: &str) -> Option<LockState> {
        let trimmed = line.trim();

        if trimmed.starts_with("signal ")
            || trimmed.starts_with("method ")
            || trimmed.starts_with("error ")
        {
            self.in_active_changed =
                trimmed.contains("ScreenSaver;") && trimmed.contains("member=ActiveChanged");
            return None;
        }

        if !self.in_active_changed {
            return None;
        }

        let state = match trimmed {
            "boolean true" => LockState::Locked,
            "boolean false" => LockState::Unlocked,
            _ => return None,
        };
        self.in_active_changed = false;
        Some(state)
    }
}

/// Event source backed by `dbus-monitor --session`.
pub struct ScreenSaverMonitor {
    program: String,
}

impl ScreenSaverMonitor {
    pub fn new() -> Self {
        Self::with_program("dbus-monitor")
    }

    /// Use a different monitor binary (for testing).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ScreenSaverMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for ScreenSaverMonitor {
    fn name(&self) -> &'static str {
        "screensaver"
    }

    fn subscribe(self: Box<Self>, events: UnboundedSender<SystemEvent>) -> Result<Subscription> {
        let mut child = Command::new(&self.program)
            .arg("--session")
            .args(MATCH_RULES)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Subscription(format!("Failed to start {}: {}", self.program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Subscription(format!("No stdout from {}", self.program)))?;

        info!(program = %self.program, "Subscribed to screensaver ActiveChanged signals");

        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut parser = ActiveChangedParser::new();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(state) = parser.feed(&line) {
                            debug!(state = %state, "Screensaver state changed");
                            if events.send(SystemEvent::Lock(state)).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) => {
                        warn!("dbus-monitor exited; no further lock events");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read dbus-monitor output");
                        break;
                    }
                }
            }

            drop(child);
        });

        Ok(Subscription::new(self.name(), task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
signal time=1729300000.123 sender=org.freedesktop.DBus -> destination=:1.88 serial=2 path=/org/freedesktop/DBus; interface=org.freedesktop.DBus; member=NameAcquired
   string \":1.88\"
signal time=1729300010.456 sender=:1.20 -> destination=(null destination) serial=301 path=/org/freedesktop/ScreenSaver; interface=org.freedesktop.ScreenSaver; member=ActiveChanged
   boolean true
signal time=1729300020.789 sender=:1.20 -> destination=(null destination) serial=302 path=/org/gnome/ScreenSaver; interface=org.gnome.ScreenSaver; member=ActiveChanged
   boolean false
signal time=1729300030.000 sender=:1.21 -> destination=(null destination) serial=9 path=/org/example; interface=org.example.Other; member=Changed
   boolean true
";

    #[test]
    fn test_parser_extracts_lock_states() {
        let mut parser = ActiveChangedParser::new();
        let states: Vec<LockState> = SAMPLE.lines().filter_map(|l| parser.feed(l)).collect();
        assert_eq!(states, vec![LockState::Locked, LockState::Unlocked]);
    }

    #[test]
    fn test_parser_ignores_booleans_outside_signal() {
        let mut parser = ActiveChangedParser::new();
        assert_eq!(parser.feed("   boolean true"), None);
    }

    #[tokio::test]
    async fn test_missing_monitor_binary() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let monitor = ScreenSaverMonitor::with_program("/nonexistent/dbus-monitor");
        let result = Box::new(monitor).subscribe(tx);
        assert!(matches!(result, Err(Error::Subscription(_))));
    }
}
