//! Line-oriented event source.
//!
//! Reads one event per line, either from stdin or from the stdout of a
//! watcher command:
//!
//! ```text
//! unlocked
//! locked
//! display-enabled <id> [builtin]
//! display-disabled <id> [builtin]
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::adapters::display::TrackedDisplays;
use crate::domain::{DisplayChange, DisplayId, LockState, SystemEvent};
use crate::error::{Error, Result};
use crate::ports::{EventSource, Subscription};

type BoxedReader = Box<dyn AsyncBufRead + Unpin + Send>;

enum Input {
    Reader(BoxedReader),
    Stdin,
    Command(String),
}

/// Event source parsing the line protocol.
pub struct LineEventSource {
    input: Input,
    displays: Arc<TrackedDisplays>,
}

impl LineEventSource {
    /// Read events from standard input.
    pub fn stdin() -> Self {
        Self::with_input(Input::Stdin)
    }

    /// Run `command` through `sh -c` and read events from its stdout.
    pub fn command(command: impl Into<String>) -> Self {
        Self::with_input(Input::Command(command.into()))
    }

    /// Read events from an arbitrary reader (for testing).
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self::with_input(Input::Reader(Box::new(reader)))
    }

    fn with_input(input: Input) -> Self {
        Self {
            input,
            displays: Arc::new(TrackedDisplays::new()),
        }
    }

    /// Topology for the arbiter, built from this source's display lines as
    /// the daemon dispatches them.
    pub fn displays(&self) -> Arc<TrackedDisplays> {
        Arc::clone(&self.displays)
    }
}

/// Parse one line. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<SystemEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };

    let event = match keyword {
        "unlocked" => SystemEvent::Lock(LockState::Unlocked),
        "locked" => SystemEvent::Lock(LockState::Locked),
        "display-enabled" | "display-disabled" => {
            let id = words
                .next()
                .ok_or_else(|| Error::Parse(format!("Missing display id: {}", line)))?
                .parse::<DisplayId>()
                .map_err(|e| Error::Parse(format!("Invalid display id in {:?}: {}", line, e)))?;
            let builtin = match words.next() {
                None => false,
                Some("builtin") => true,
                Some(other) => {
                    return Err(Error::Parse(format!("Unexpected display flag: {}", other)))
                }
            };
            SystemEvent::Display(DisplayChange {
                id,
                enabled: keyword == "display-enabled",
                builtin,
            })
        }
        _ => return Err(Error::Parse(format!("Unknown event: {}", line))),
    };

    if words.next().is_some() {
        return Err(Error::Parse(format!("Trailing input: {}", line)));
    }

    Ok(Some(event))
}

async fn pump(reader: BoxedReader, events: UnboundedSender<SystemEvent>) {
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_line(&line) {
                Ok(Some(event)) => {
                    if events.send(event).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Skipping malformed event line"),
            },
            Ok(None) => {
                debug!("Event stream closed");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read event stream");
                return;
            }
        }
    }
}

impl EventSource for LineEventSource {
    fn name(&self) -> &'static str {
        match self.input {
            Input::Reader(_) => "lines",
            Input::Stdin => "stdin",
            Input::Command(_) => "command",
        }
    }

    fn subscribe(self: Box<Self>, events: UnboundedSender<SystemEvent>) -> Result<Subscription> {
        let name = self.name();
        let LineEventSource { input, .. } = *self;

        let task = match input {
            Input::Reader(reader) => tokio::spawn(pump(reader, events)),
            Input::Stdin => {
                let reader: BoxedReader = Box::new(BufReader::new(tokio::io::stdin()));
                tokio::spawn(pump(reader, events))
            }
            Input::Command(command) => {
                let mut child = Command::new("/bin/sh")
                    .arg("-c")
                    .arg(&command)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .kill_on_drop(true)
                    .spawn()
                    .map_err(|e| {
                        Error::Subscription(format!("Failed to start {:?}: {}", command, e))
                    })?;
                let stdout = child.stdout.take().ok_or_else(|| {
                    Error::Subscription(format!("No stdout from {:?}", command))
                })?;
                debug!(command = %command, "Started event watcher command");

                let reader: BoxedReader = Box::new(BufReader::new(stdout));
                tokio::spawn(async move {
                    pump(reader, events).await;
                    match child.wait().await {
                        Ok(status) => debug!(status = %status, "Event watcher exited"),
                        Err(e) => warn!(error = %e, "Failed to reap event watcher"),
                    }
                })
            }
        };

        Ok(Subscription::new(name, task))
    }
}
