//! DRM connector topology from sysfs (`/sys/class/drm`).
//!
//! Each connector shows up as `card<N>-<connector>` with a `status` file
//! (`connected`/`disconnected`) and, on most drivers, an `enabled` file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::{DisplayChange, DisplayId, DisplayInfo, SystemEvent};
use crate::error::{Error, Result};
use crate::ports::{DisplayTopology, EventSource, Subscription};

/// Default sysfs DRM class directory.
pub const DEFAULT_DRM_ROOT: &str = "/sys/class/drm";

/// Connector types wired to an internal panel.
const BUILTIN_CONNECTORS: &[&str] = &["eDP", "LVDS", "DSI"];

/// Display topology read from sysfs.
#[derive(Debug, Clone)]
pub struct SysfsDisplays {
    root: PathBuf,
}

impl SysfsDisplays {
    pub fn new() -> Self {
        Self::with_root(DEFAULT_DRM_ROOT)
    }

    /// Read from a custom root (for testing).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active connectors keyed by display id.
    pub fn snapshot(&self) -> Result<BTreeMap<DisplayId, DisplayInfo>> {
        let mut displays = BTreeMap::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(connector) = connector_name(&file_name.to_string_lossy()) else {
                continue;
            };

            let path = entry.path();
            if !is_active(&path) {
                continue;
            }

            let id = display_id(&connector);
            displays.insert(
                id,
                DisplayInfo {
                    id,
                    builtin: is_builtin(&connector),
                },
            );
        }

        Ok(displays)
    }
}

impl Default for SysfsDisplays {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayTopology for SysfsDisplays {
    fn active_displays(&self) -> Vec<DisplayInfo> {
        match self.snapshot() {
            Ok(displays) => displays.into_values().collect(),
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Failed to read display topology");
                Vec::new()
            }
        }
    }
}

/// `card0-HDMI-A-1` -> `HDMI-A-1`. Render nodes and bare cards yield `None`.
fn connector_name(entry: &str) -> Option<String> {
    let rest = entry.strip_prefix("card")?;
    let (index, connector) = rest.split_once('-')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) || connector.is_empty() {
        return None;
    }
    Some(connector.to_string())
}

fn is_builtin(connector: &str) -> bool {
    BUILTIN_CONNECTORS.iter().any(|prefix| connector.starts_with(prefix))
}

fn is_active(connector_dir: &Path) -> bool {
    let status = fs::read_to_string(connector_dir.join("status")).unwrap_or_default();
    if status.trim() != "connected" {
        return false;
    }
    // Drivers without an `enabled` attribute only report connection state.
    match fs::read_to_string(connector_dir.join("enabled")) {
        Ok(enabled) => enabled.trim() == "enabled",
        Err(_) => true,
    }
}

/// Stable id for a connector name (FNV-1a).
fn display_id(connector: &str) -> DisplayId {
    connector.bytes().fold(0x811c_9dc5u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

/// Diff two snapshots into enable/disable notifications.
fn diff(
    previous: &BTreeMap<DisplayId, DisplayInfo>,
    current: &BTreeMap<DisplayId, DisplayInfo>,
) -> Vec<DisplayChange> {
    let removed = previous
        .values()
        .filter(|d| !current.contains_key(&d.id))
        .map(|d| DisplayChange {
            id: d.id,
            enabled: false,
            builtin: d.builtin,
        });
    let added = current
        .values()
        .filter(|d| !previous.contains_key(&d.id))
        .map(|d| DisplayChange {
            id: d.id,
            enabled: true,
            builtin: d.builtin,
        });
    removed.chain(added).collect()
}

/// Event source that polls sysfs and reports connector changes.
pub struct SysfsDisplayWatcher {
    displays: SysfsDisplays,
    poll_interval: Duration,
}

impl SysfsDisplayWatcher {
    pub fn new(displays: SysfsDisplays, poll_interval: Duration) -> Self {
        Self {
            displays,
            poll_interval,
        }
    }
}

impl EventSource for SysfsDisplayWatcher {
    fn name(&self) -> &'static str {
        "sysfs-displays"
    }

    fn subscribe(self: Box<Self>, events: UnboundedSender<SystemEvent>) -> Result<Subscription> {
        let name = self.name();
        let SysfsDisplayWatcher {
            displays,
            poll_interval,
        } = *self;

        if poll_interval.is_zero() {
            return Err(Error::Configuration(
                "Display poll interval must be greater than zero".to_string(),
            ));
        }
        let mut previous = displays.snapshot().map_err(|e| {
            Error::Subscription(format!("Cannot read {}: {}", displays.root().display(), e))
        })?;

        info!(
            root = %displays.root().display(),
            poll = ?poll_interval,
            "Watching display connectors"
        );

        let task = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let current = match displays.snapshot() {
                    Ok(current) => current,
                    Err(e) => {
                        debug!(error = %e, "Display snapshot failed; keeping previous state");
                        continue;
                    }
                };

                for change in diff(&previous, &current) {
                    debug!(
                        display = change.id,
                        enabled = change.enabled,
                        builtin = change.builtin,
                        "Display reconfigured"
                    );
                    if events.send(SystemEvent::Display(change)).is_err() {
                        return;
                    }
                }
                previous = current;
            }
        });

        Ok(Subscription::new(name, task))
    }
}
