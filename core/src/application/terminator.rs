//! Process termination by name.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::adapters::{NixSignalSender, SystemProcessTable};
use crate::domain::{select_targets, SignalKind};
use crate::ports::{ProcessTable, SignalSender, Terminate};

/// Resolves target names against a fresh process listing and signals every match.
///
/// Uses the `ProcessTable` and `SignalSender` ports, so the platform
/// implementations can be swapped for mocks.
pub struct ProcessTerminator<P, S> {
    table: P,
    sender: S,
}

impl<P: ProcessTable, S: SignalSender> ProcessTerminator<P, S> {
    pub fn new(table: P, sender: S) -> Self {
        Self { table, sender }
    }
}

impl ProcessTerminator<SystemProcessTable, NixSignalSender> {
    /// Terminator wired to the current platform.
    pub fn system() -> Self {
        Self::new(SystemProcessTable::new(), NixSignalSender::new())
    }
}

impl<P, S> Terminate for ProcessTerminator<P, S>
where
    P: ProcessTable + 'static,
    S: SignalSender + 'static,
{
    async fn terminate(&self, names: &BTreeSet<String>, signal: SignalKind) -> bool {
        let records = match self.table.list().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Process enumeration failed; treating as no matches");
                return false;
            }
        };

        let mut any_signaled = false;
        for record in select_targets(&records, names) {
            match self.sender.send(record.pid, signal) {
                Ok(()) => {
                    any_signaled = true;
                    info!(
                        pid = record.pid,
                        process = %record.name,
                        signal = %signal,
                        "Sent signal"
                    );
                }
                Err(e) => {
                    info!(pid = record.pid, process = %record.name, error = %e, "Signal not delivered");
                }
            }
        }

        if !any_signaled {
            debug!(signal = %signal, targets = ?names, "No matching process signaled");
        }
        any_signaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProcessRecord;
    use crate::error::{Error, Result};
    use parking_lot::Mutex;

    struct MockTable {
        records: Result<Vec<ProcessRecord>>,
    }

    impl MockTable {
        fn with(records: Vec<ProcessRecord>) -> Self {
            Self {
                records: Ok(records),
            }
        }

        fn failing() -> Self {
            Self {
                records: Err(Error::Enumeration("EAGAIN".into())),
            }
        }
    }

    impl ProcessTable for MockTable {
        async fn list(&self) -> Result<Vec<ProcessRecord>> {
            match &self.records {
                Ok(records) => Ok(records.clone()),
                Err(e) => Err(Error::Enumeration(e.to_string())),
            }
        }
    }

    /// Records deliveries; PIDs in `dead` fail as already exited.
    #[derive(Default)]
    struct MockSender {
        dead: Vec<u32>,
        sent: Mutex<Vec<(u32, SignalKind)>>,
    }

    impl SignalSender for MockSender {
        fn send(&self, pid: u32, signal: SignalKind) -> Result<()> {
            if self.dead.contains(&pid) {
                return Err(Error::Delivery {
                    pid,
                    signal,
                    reason: "process already exited".into(),
                });
            }
            self.sent.lock().push((pid, signal));
            Ok(())
        }
    }

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_signals_every_exact_match() {
        let table = MockTable::with(vec![
            ProcessRecord::new(100, "WallpaperAerialsExtension"),
            ProcessRecord::new(101, "WallpaperAerialsExtensionHelper"),
            ProcessRecord::new(102, "WallpaperAerialsExtension"),
            ProcessRecord::new(103, "Dock"),
        ]);
        let terminator = ProcessTerminator::new(table, MockSender::default());

        let signaled = terminator
            .terminate(&names(&["WallpaperAerialsExtension"]), SignalKind::Terminate)
            .await;

        assert!(signaled);
        assert_eq!(
            *terminator.sender.sent.lock(),
            vec![(100, SignalKind::Terminate), (102, SignalKind::Terminate)]
        );
    }

    #[tokio::test]
    async fn test_no_matches() {
        let table = MockTable::with(vec![ProcessRecord::new(5, "launchd")]);
        let terminator = ProcessTerminator::new(table, MockSender::default());

        assert!(!terminator.terminate(&names(&["Dock"]), SignalKind::Kill).await);
        assert!(terminator.sender.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_enumeration_failure_is_no_match() {
        let terminator = ProcessTerminator::new(MockTable::failing(), MockSender::default());
        assert!(!terminator.terminate(&names(&["Dock"]), SignalKind::Kill).await);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_stop_siblings() {
        let table = MockTable::with(vec![
            ProcessRecord::new(10, "Dock"),
            ProcessRecord::new(11, "Dock"),
        ]);
        let sender = MockSender {
            dead: vec![10],
            ..Default::default()
        };
        let terminator = ProcessTerminator::new(table, sender);

        assert!(terminator.terminate(&names(&["Dock"]), SignalKind::Kill).await);
        assert_eq!(*terminator.sender.sent.lock(), vec![(11, SignalKind::Kill)]);
    }

    #[tokio::test]
    async fn test_all_deliveries_failed() {
        let table = MockTable::with(vec![ProcessRecord::new(10, "Dock")]);
        let sender = MockSender {
            dead: vec![10],
            ..Default::default()
        };
        let terminator = ProcessTerminator::new(table, sender);

        assert!(!terminator.terminate(&names(&["Dock"]), SignalKind::Terminate).await);
    }
}
