//! Tracing/logging initialization.
//!
//! JSON logs behind an env filter, written through a non-blocking worker so
//! shutdown can flush whatever is still buffered.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops and return
/// `None`). The guard must outlive all logging; dropping it flushes and
/// stops the writer thread.
pub fn init() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    // JSON logs + timestamps, configurable via RUST_LOG.
    let initialised = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(writer)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok();

    initialised.then_some(guard)
}
