//! Test doubles shared by the application service tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::domain::{DisplayInfo, SignalKind};
use crate::ports::{DisplayTopology, Terminate};

/// Records every terminate call with the (tokio) time it happened.
pub struct RecordingTerminator {
    signals_any: AtomicBool,
    calls: Mutex<Vec<(SignalKind, Instant)>>,
}

impl RecordingTerminator {
    /// A terminator whose calls report `signals_any`.
    pub fn new(signals_any: bool) -> Self {
        Self {
            signals_any: AtomicBool::new(signals_any),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(SignalKind, Instant)> {
        self.calls.lock().clone()
    }

    pub fn signals(&self) -> Vec<SignalKind> {
        self.calls.lock().iter().map(|(s, _)| *s).collect()
    }
}

impl Terminate for RecordingTerminator {
    async fn terminate(&self, _names: &BTreeSet<String>, signal: SignalKind) -> bool {
        self.calls.lock().push((signal, Instant::now()));
        self.signals_any.load(Ordering::SeqCst)
    }
}

/// Topology with a settable external-display flag.
#[derive(Default)]
pub struct FixedDisplays {
    external: AtomicBool,
}

impl FixedDisplays {
    pub fn builtin_only() -> Self {
        Self::default()
    }

    pub fn with_external() -> Self {
        Self {
            external: AtomicBool::new(true),
        }
    }

    pub fn set_external(&self, external: bool) {
        self.external.store(external, Ordering::SeqCst);
    }
}

impl DisplayTopology for FixedDisplays {
    fn active_displays(&self) -> Vec<DisplayInfo> {
        let mut displays = vec![DisplayInfo::builtin(1)];
        if self.external.load(Ordering::SeqCst) {
            displays.push(DisplayInfo::external(2));
        }
        displays
    }
}
