//! LockKiller CLI - Terminate named processes on screen unlock or lock
//!
//! Runs as a long-lived daemon: waits for the configured lock-state event,
//! optionally waits for external displays to attach, then signals every
//! process whose name matches a target.

mod logging;
mod sources;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use lockkiller_core::{
    Daemon, ProcessTerminator, ShutdownReason, SignalKind, TerminationPolicy, TriggerArbiter,
    TriggerEvent,
};
use tokio::signal::unix::{signal, SignalKind as UnixSignal};
use tracing::{info, warn};

use sources::SourceKind;

#[derive(Parser, Debug)]
#[command(name = "lockkiller")]
#[command(author, version, about = "Terminate named processes on screen unlock or lock")]
struct Cli {
    /// Process name to terminate (repeatable) [default: WallpaperAerialsExtension]
    #[arg(long = "process", value_name = "NAME")]
    processes: Vec<String>,

    /// Event to trigger on
    #[arg(long, value_name = "unlock|lock", default_value = "unlock", value_parser = parse_trigger)]
    event: TriggerEvent,

    /// Primary signal
    #[arg(long, value_name = "TERM|KILL", default_value = "TERM", value_parser = parse_signal)]
    signal: SignalKind,

    /// If >0, send --force-signal this many milliseconds after the primary signal (negative means 0)
    #[arg(long, value_name = "MS", default_value = "0", value_parser = parse_millis, allow_negative_numbers = true)]
    force_after_ms: u64,

    /// Force signal
    #[arg(long, value_name = "KILL|TERM", default_value = "KILL", value_parser = parse_signal)]
    force_signal: SignalKind,

    /// Wait for external displays to be ready before killing (multi-monitor fix)
    #[arg(long)]
    wait_for_displays: bool,

    /// Fallback timeout when waiting for displays (negative means 0)
    #[arg(long, value_name = "MS", default_value = "5000", value_parser = parse_millis, allow_negative_numbers = true)]
    display_timeout_ms: u64,

    /// Delay before killing when an external display is already attached (negative means 0)
    #[arg(long, value_name = "MS", default_value = "1500", value_parser = parse_millis, allow_negative_numbers = true)]
    settle_delay_ms: u64,

    /// Where lock and display events come from
    #[arg(long, value_enum, default_value_t = SourceKind::Auto)]
    source: SourceKind,

    /// Watcher command for --source command (run through sh -c)
    #[arg(long, value_name = "CMD", required_if_eq("source", "command"))]
    source_command: Option<String>,

    /// Display connector poll interval for the native display watcher
    #[arg(long, value_name = "MS", default_value_t = 500)]
    display_poll_ms: u64,

    /// Print actions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_signal(value: &str) -> Result<SignalKind, String> {
    value.parse().map_err(|e: lockkiller_core::Error| e.to_string())
}

/// Milliseconds; negative values clamp to 0.
fn parse_millis(value: &str) -> Result<u64, String> {
    let ms: i64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid milliseconds {:?}: {}", value, e))?;
    Ok(u64::try_from(ms).unwrap_or(0))
}

fn parse_trigger(value: &str) -> Result<TriggerEvent, String> {
    value.parse().map_err(|e: lockkiller_core::Error| e.to_string())
}

impl Cli {
    fn policy(&self) -> lockkiller_core::Result<TerminationPolicy> {
        TerminationPolicy::builder()
            .processes(self.processes.iter().cloned())
            .trigger(self.event)
            .primary_signal(self.signal)
            .force_signal(self.force_signal)
            .grace_period(Duration::from_millis(self.force_after_ms))
            .wait_for_displays(self.wait_for_displays)
            .display_timeout(Duration::from_millis(self.display_timeout_ms))
            .settle_delay(Duration::from_millis(self.settle_delay_ms))
            .build()
    }
}

/// Completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(UnixSignal::terminate()),
        signal(UnixSignal::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Failed to install signal handlers; running until killed");
            std::future::pending::<()>().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let policy = match cli.policy() {
        Ok(policy) => policy,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    let wiring = sources::build(
        cli.source,
        cli.source_command.as_deref(),
        policy.wait_for_displays,
        Duration::from_millis(cli.display_poll_ms),
    )
    .context("Failed to set up event sources")?;

    let terminator = Arc::new(ProcessTerminator::system());
    let arbiter = TriggerArbiter::new(Arc::new(policy), terminator, wiring.displays);

    let daemon = wiring
        .sources
        .into_iter()
        .fold(Daemon::new(arbiter), Daemon::with_source)
        .subscribe()
        .context("Failed to subscribe to event sources")?;

    match daemon.run_until(shutdown_signal()).await {
        ShutdownReason::Requested => info!("Shutting down"),
        ShutdownReason::SourcesClosed => info!("No event sources left, exiting"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_legacy_behavior() {
        let cli = Cli::try_parse_from(["lockkiller"]).unwrap();
        let policy = cli.policy().unwrap();

        assert_eq!(policy.trigger, TriggerEvent::OnUnlock);
        assert_eq!(policy.primary_signal, SignalKind::Terminate);
        assert_eq!(policy.force_signal, SignalKind::Kill);
        assert!(!policy.escalates());
        assert!(!policy.wait_for_displays);
        assert_eq!(policy.display_timeout, Duration::from_millis(5000));
        assert_eq!(policy.settle_delay, Duration::from_millis(1500));
        assert!(policy.names().contains("WallpaperAerialsExtension"));
        assert_eq!(cli.source, SourceKind::Auto);
    }

    #[test]
    fn test_full_flag_set() {
        let cli = Cli::try_parse_from([
            "lockkiller",
            "--process",
            "Dock",
            "--process",
            "Finder",
            "--event",
            "lock",
            "--signal",
            "KILL",
            "--force-signal",
            "SIGTERM",
            "--force-after-ms",
            "300",
            "--wait-for-displays",
            "--display-timeout-ms",
            "8000",
            "--verbose",
        ])
        .unwrap();
        let policy = cli.policy().unwrap();

        assert_eq!(policy.names().len(), 2);
        assert!(!policy.names().contains("WallpaperAerialsExtension"));
        assert_eq!(policy.trigger, TriggerEvent::OnLock);
        assert_eq!(policy.primary_signal, SignalKind::Kill);
        assert_eq!(policy.force_signal, SignalKind::Terminate);
        assert_eq!(policy.grace_period, Duration::from_millis(300));
        assert!(policy.wait_for_displays);
        assert_eq!(policy.display_timeout, Duration::from_millis(8000));
        assert!(cli.verbose);
    }

    #[test]
    fn test_invalid_values_are_usage_errors() {
        for args in [
            vec!["lockkiller", "--event", "sleep"],
            vec!["lockkiller", "--signal", "HUP"],
            vec!["lockkiller", "--force-after-ms", "soon"],
            vec!["lockkiller", "--bogus"],
            vec!["lockkiller", "--source", "command"],
        ] {
            let err = Cli::try_parse_from(&args).unwrap_err();
            assert_eq!(err.exit_code(), 2, "args: {:?}", args);
        }
    }

    #[test]
    fn test_negative_durations_clamp_to_zero() {
        let cli = Cli::try_parse_from([
            "lockkiller",
            "--force-after-ms",
            "-5",
            "--display-timeout-ms",
            "-1",
            "--settle-delay-ms=-20",
        ])
        .unwrap();
        let policy = cli.policy().unwrap();

        assert_eq!(policy.grace_period, Duration::ZERO);
        assert!(!policy.escalates());
        assert_eq!(policy.display_timeout, Duration::ZERO);
        assert_eq!(policy.settle_delay, Duration::ZERO);
    }

    #[test]
    fn test_blank_process_name_rejected() {
        let cli = Cli::try_parse_from(["lockkiller", "--process", ""]).unwrap();
        assert!(cli.policy().is_err());
    }
}
