//! Tracing, logging, diagnostics (shared setup).

pub use tracing_appender::non_blocking::WorkerGuard;

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call multiple times; subsequent calls become no-ops. Hold the
/// returned guard for the life of the process — dropping it flushes the
/// non-blocking writer on shutdown.
pub fn init() -> Option<WorkerGuard> {
    tracing::init()
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Diagnostics logger abstraction shared by the storage layer and handlers.
pub mod log;

/// Callback-backed capture logger for tests.
pub mod capture;

pub use capture::CaptureLogger;
pub use log::{DiagnosticsLogger, LogLevel, ScopeHandle, TracingLogger};
