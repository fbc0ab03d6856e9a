//! Event source selection.

use std::time::Duration;

use clap::ValueEnum;
use lockkiller_core::adapters::LineEventSource;
use lockkiller_core::ports::{DisplayTopology, EventSource};
use lockkiller_core::Result;

/// Where lock and display events come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// The platform's native notifications
    Auto,
    /// Line protocol on standard input
    Stdin,
    /// Line protocol on the stdout of --source-command
    Command,
}

/// Event sources plus the topology the arbiter should query.
pub struct Wiring {
    pub displays: Box<dyn DisplayTopology>,
    pub sources: Vec<Box<dyn EventSource>>,
}

pub fn build(
    kind: SourceKind,
    command: Option<&str>,
    wait_for_displays: bool,
    display_poll: Duration,
) -> Result<Wiring> {
    match kind {
        SourceKind::Stdin => Ok(line_wiring(LineEventSource::stdin())),
        SourceKind::Command => {
            let command = command.ok_or_else(|| {
                lockkiller_core::Error::Configuration(
                    "--source-command is required with --source command".to_string(),
                )
            })?;
            Ok(line_wiring(LineEventSource::command(command)))
        }
        SourceKind::Auto => native(wait_for_displays, display_poll),
    }
}

fn line_wiring(source: LineEventSource) -> Wiring {
    Wiring {
        displays: Box::new(source.displays()),
        sources: vec![Box::new(source)],
    }
}

#[cfg(target_os = "linux")]
fn native(wait_for_displays: bool, display_poll: Duration) -> Result<Wiring> {
    use lockkiller_core::adapters::{ScreenSaverMonitor, SysfsDisplayWatcher, SysfsDisplays};

    let displays = SysfsDisplays::new();
    let mut sources: Vec<Box<dyn EventSource>> = vec![Box::new(ScreenSaverMonitor::new())];
    if wait_for_displays {
        sources.push(Box::new(SysfsDisplayWatcher::new(
            displays.clone(),
            display_poll,
        )));
    }

    Ok(Wiring {
        displays: Box::new(displays),
        sources,
    })
}

#[cfg(not(target_os = "linux"))]
fn native(_wait_for_displays: bool, _display_poll: Duration) -> Result<Wiring> {
    Err(lockkiller_core::Error::Subscription(
        "no native lock-event source on this platform; use --source stdin or --source command"
            .to_string(),
    ))
}
