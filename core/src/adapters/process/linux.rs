//! Linux process table using procfs.

use procfs::process::{all_processes, Process};
use tracing::trace;

use crate::domain::ProcessRecord;
use crate::error::{Error, Result};

use super::image_name;

/// Linux-specific process table.
///
/// The image name comes from the `/proc/<pid>/exe` link when it is readable.
/// Processes owned by other users fall back to `comm`, which the kernel
/// truncates to 15 bytes.
pub struct LinuxProcessTable;

impl LinuxProcessTable {
    pub fn new() -> Self {
        Self
    }

    pub async fn list(&self) -> Result<Vec<ProcessRecord>> {
        let processes =
            all_processes().map_err(|e| Error::Enumeration(format!("Failed to read /proc: {}", e)))?;

        let mut records = Vec::new();
        for process in processes {
            // Processes can exit between readdir and stat.
            let Ok(process) = process else {
                continue;
            };
            let Ok(pid) = u32::try_from(process.pid()) else {
                continue;
            };
            match process_name(&process) {
                Some(name) => records.push(ProcessRecord::new(pid, name)),
                None => trace!(pid = pid, "Skipping process without a readable name"),
            }
        }

        Ok(records)
    }
}

fn process_name(process: &Process) -> Option<String> {
    if let Ok(exe) = process.exe() {
        let path = exe.to_string_lossy();
        let path = path.strip_suffix(" (deleted)").unwrap_or(&path);
        let name = image_name(path);
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    process.stat().ok().map(|stat| stat.comm)
}
