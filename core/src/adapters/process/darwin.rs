//! macOS process table using ps.

use std::process::Stdio;

use tokio::process::Command;

use crate::domain::ProcessRecord;
use crate::error::{Error, Result};

use super::image_name;

/// macOS-specific process table backed by `ps -axo pid=,comm=`.
///
/// `comm` is the full executable path, so the image name is not truncated
/// to `MAXCOMLEN` the way `ps -c` output is.
pub struct DarwinProcessTable;

impl DarwinProcessTable {
    /// Create a new macOS process table.
    pub fn new() -> Self {
        Self
    }

    pub async fn list(&self) -> Result<Vec<ProcessRecord>> {
        let output = Command::new("/bin/ps")
            .args(["-axo", "pid=,comm="])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Enumeration(format!("Failed to run ps: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Enumeration(format!(
                "ps exited with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_ps_output(&stdout))
    }
}

/// Parse `pid comm` lines. Malformed lines are skipped.
pub(super) fn parse_ps_output(output: &str) -> Vec<ProcessRecord> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.trim_start().splitn(2, char::is_whitespace);
            let pid: u32 = parts.next()?.parse().ok()?;
            let command = parts.next()?.trim();
            if command.is_empty() {
                return None;
            }
            Some(ProcessRecord::new(pid, image_name(command)))
        })
        .collect()
}
