//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// Quiet (`warn`) unless `--verbose`; `RUST_LOG` overrides both.
pub fn init(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}
