//! Callback-backed capture logger for tests.
//!
//! Redirects log calls into a test-supplied callback, filtered by a minimum
//! severity set at construction. Scopes are not supported.

use std::sync::Arc;

use armature_core::{DomainError, DomainResult};

use crate::log::{DiagnosticsLogger, LogLevel, ScopeHandle};

/// Adapter that hands every formatted log line to a single callback.
pub struct CaptureLogger {
    callback: Arc<dyn Fn(String) + Send + Sync>,
    min_level: LogLevel,
}

impl CaptureLogger {
    pub fn new(callback: impl Fn(String) + Send + Sync + 'static, min_level: LogLevel) -> Self {
        Self {
            callback: Arc::new(callback),
            min_level,
        }
    }
}

impl DiagnosticsLogger for CaptureLogger {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn log_with(
        &self,
        level: LogLevel,
        formatter: Option<&dyn Fn() -> String>,
    ) -> DomainResult<()> {
        if !self.enabled(level) {
            // Short-circuits before the formatter guard: a disabled call with
            // no formatter must not fail, and no formatting work is done.
            return Ok(());
        }

        let formatter = formatter.ok_or(DomainError::missing_argument("formatter"))?;
        let message = formatter();

        if !message.is_empty() {
            (self.callback)(format!("Log Level: {level}, {message}"));
        }
        Ok(())
    }

    fn begin_scope(&self, _name: &str) -> Option<ScopeHandle> {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    const LEVELS: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Information,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    fn capturing(min_level: LogLevel) -> (CaptureLogger, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let logger = CaptureLogger::new(
            move |line| sink.lock().unwrap().push(line),
            min_level,
        );
        (logger, lines)
    }

    proptest! {
        #[test]
        fn enabled_iff_level_at_or_above_threshold(level_idx in 0usize..6, threshold_idx in 0usize..6) {
            let level = LEVELS[level_idx];
            let threshold = LEVELS[threshold_idx];
            let (logger, _lines) = capturing(threshold);

            prop_assert_eq!(logger.enabled(level), level >= threshold);
        }
    }

    #[test]
    fn disabled_call_formats_nothing_and_invokes_nothing() {
        let (logger, lines) = capturing(LogLevel::Warning);
        let formatted = AtomicBool::new(false);

        let formatter = || {
            formatted.store(true, Ordering::SeqCst);
            "should not appear".to_string()
        };
        logger
            .log_with(LogLevel::Information, Some(&formatter))
            .unwrap();

        assert!(!formatted.load(Ordering::SeqCst));
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn enabled_call_prefixes_level_onto_message() {
        let (logger, lines) = capturing(LogLevel::Information);

        let formatter = || "disk full".to_string();
        logger.log_with(LogLevel::Warning, Some(&formatter)).unwrap();

        assert_eq!(
            lines.lock().unwrap().as_slice(),
            ["Log Level: Warning, disk full"]
        );
    }

    #[test]
    fn empty_message_is_suppressed_even_when_enabled() {
        let (logger, lines) = capturing(LogLevel::Information);

        let formatter = String::new;
        logger.log_with(LogLevel::Error, Some(&formatter)).unwrap();

        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_formatter_fails_only_when_enabled() {
        let (logger, _lines) = capturing(LogLevel::Warning);

        // Disabled: short-circuits before the formatter guard.
        assert!(logger.log_with(LogLevel::Debug, None).is_ok());

        // Enabled: the missing argument is named.
        let err = logger.log_with(LogLevel::Error, None).unwrap_err();
        assert_eq!(err, DomainError::MissingArgument("formatter"));
    }

    #[test]
    fn begin_scope_is_a_no_op() {
        let (logger, _lines) = capturing(LogLevel::Trace);
        assert!(logger.begin_scope("ignored").is_none());
    }
}
