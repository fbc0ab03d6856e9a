//! Process enumeration and signal delivery adapters.
//!
//! Platform-specific implementations of [`ProcessTable`] plus the
//! `nix`-backed [`SignalSender`].

#[cfg(any(target_os = "macos", test))]
mod darwin;

#[cfg(target_os = "linux")]
mod linux;

mod signal;

pub use signal::NixSignalSender;

use crate::domain::ProcessRecord;
use crate::error::Result;
use crate::ports::ProcessTable;

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
compile_error!("Unsupported platform: only macOS and Linux are supported");

/// The process table for the current platform.
pub struct SystemProcessTable {
    #[cfg(target_os = "macos")]
    inner: darwin::DarwinProcessTable,

    #[cfg(target_os = "linux")]
    inner: linux::LinuxProcessTable,
}

impl SystemProcessTable {
    /// Create a process table for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "macos")]
            inner: darwin::DarwinProcessTable::new(),

            #[cfg(target_os = "linux")]
            inner: linux::LinuxProcessTable::new(),
        }
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcessTable {
    async fn list(&self) -> Result<Vec<ProcessRecord>> {
        self.inner.list().await
    }
}

/// Image name from an executable path (`/usr/bin/foo` -> `foo`).
fn image_name(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_name() {
        assert_eq!(
            image_name("/System/Library/ExtensionKit/Extensions/WallpaperAerialsExtension"),
            "WallpaperAerialsExtension"
        );
        assert_eq!(image_name("launchd"), "launchd");
        assert_eq!(image_name("/Applications/My App.app/Contents/MacOS/My App"), "My App");
    }

    #[test]
    fn test_system_table_contains_current_process() {
        let table = SystemProcessTable::new();
        let records = tokio_test::assert_ok!(tokio_test::block_on(table.list()));
        let me = std::process::id();
        assert!(records.iter().any(|r| r.pid == me));
    }
}
