//! Diagnostics logger abstraction.
//!
//! A narrow logging seam for code that wants an injectable logger rather
//! than the global `tracing` macros (the storage layer, shared handler
//! dependencies). Production code binds [`TracingLogger`]; tests bind the
//! capture logger from [`crate::capture`].

use armature_core::{DomainError, DomainResult};

/// Log severity, ordered from least to most severe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Critical",
        };
        f.write_str(name)
    }
}

/// Handle returned by [`DiagnosticsLogger::begin_scope`]; holding it keeps
/// the underlying span alive.
pub struct ScopeHandle {
    _span: tracing::Span,
}

impl ScopeHandle {
    pub(crate) fn new(span: tracing::Span) -> Self {
        Self { _span: span }
    }
}

/// Injectable logger seam.
pub trait DiagnosticsLogger: Send + Sync {
    /// Whether `level` meets the logger's minimum severity.
    fn enabled(&self, level: LogLevel) -> bool;

    /// Log a lazily-formatted message.
    ///
    /// When the level is disabled this returns immediately and the formatter
    /// is never invoked. When enabled, the formatter is required; its absence
    /// is a missing-argument error naming `formatter`.
    fn log_with(
        &self,
        level: LogLevel,
        formatter: Option<&dyn Fn() -> String>,
    ) -> DomainResult<()>;

    /// Open a logging scope. Implementations without scope support return
    /// `None`.
    fn begin_scope(&self, _name: &str) -> Option<ScopeHandle> {
        None
    }

    /// Log an eagerly-formatted message.
    fn log(&self, level: LogLevel, message: &str) -> DomainResult<()> {
        let format = || message.to_string();
        self.log_with(level, Some(&format))
    }
}

/// Production logger: forwards to the process-wide `tracing` subscriber.
pub struct TracingLogger {
    min_level: LogLevel,
}

impl TracingLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        // The subscriber's own env filter does the real gating.
        Self::new(LogLevel::Trace)
    }
}

impl DiagnosticsLogger for TracingLogger {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn log_with(
        &self,
        level: LogLevel,
        formatter: Option<&dyn Fn() -> String>,
    ) -> DomainResult<()> {
        if !self.enabled(level) {
            return Ok(());
        }

        let formatter = formatter.ok_or(DomainError::missing_argument("formatter"))?;
        let message = formatter();
        if message.is_empty() {
            return Ok(());
        }

        match level {
            LogLevel::Trace => tracing::trace!("{message}"),
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Information => tracing::info!("{message}"),
            LogLevel::Warning => tracing::warn!("{message}"),
            LogLevel::Error | LogLevel::Critical => tracing::error!("{message}"),
        }
        Ok(())
    }

    fn begin_scope(&self, name: &str) -> Option<ScopeHandle> {
        Some(ScopeHandle::new(tracing::info_span!("scope", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order_from_trace_to_critical() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Information);
        assert!(LogLevel::Information < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn display_uses_original_names() {
        assert_eq!(LogLevel::Information.to_string(), "Information");
        assert_eq!(LogLevel::Warning.to_string(), "Warning");
    }
}
