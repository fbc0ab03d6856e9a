//! Signal delivery via `kill(2)`.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::debug;

use crate::domain::SignalKind;
use crate::error::{Error, Result};
use crate::ports::SignalSender;

/// Delivers signals with `nix::sys::signal::kill`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NixSignalSender;

impl NixSignalSender {
    pub fn new() -> Self {
        Self
    }
}

fn to_nix(signal: SignalKind) -> Signal {
    match signal {
        SignalKind::Terminate => Signal::SIGTERM,
        SignalKind::Kill => Signal::SIGKILL,
    }
}

fn describe(errno: Errno) -> String {
    match errno {
        Errno::ESRCH => "process already exited".to_string(),
        Errno::EPERM => "permission denied".to_string(),
        other => other.desc().to_string(),
    }
}

impl SignalSender for NixSignalSender {
    fn send(&self, pid: u32, signal: SignalKind) -> Result<()> {
        // 0 and negative values address process groups; never allowed here.
        let raw = match i32::try_from(pid) {
            Ok(raw) if raw > 0 => raw,
            _ => {
                return Err(Error::Delivery {
                    pid,
                    signal,
                    reason: "invalid PID".to_string(),
                })
            }
        };

        debug!(pid = pid, signal = %signal, "Sending signal to process");
        kill(Pid::from_raw(raw), to_nix(signal)).map_err(|errno| Error::Delivery {
            pid,
            signal,
            reason: describe(errno),
        })
    }
}
