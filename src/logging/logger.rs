// file: src/logging/logger.rs
// version: 1.0.0
// guid: 5d7a1c93-e2b4-4f68-8a0d-61c3b9e4f275

//! Logger initialization and configuration

use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Console output goes to stderr so the final summary on stdout stays clean.
/// When `log_file` is given, every event is also appended there without ANSI colors.
pub fn init_logger(verbose: bool, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| {
            crate::error::ProvisionError::ConfigError(format!(
                "Failed to initialize logger: {}",
                e
            ))
        })?;

    Ok(())
}

/// Create a scoped logger for operations
pub fn with_operation_span<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let span = tracing::info_span!("operation", name = operation);
    let _enter = span.enter();
    f()
}

/// Span for one pipeline phase; attach it with `.instrument(...)`
pub fn phase_span(phase: &str) -> tracing::Span {
    tracing::info_span!("phase", name = phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Instrument;

    #[test]
    fn test_init_logger_twice_reports_error() {
        // The global subscriber can only be installed once per process, so the
        // second call must fail gracefully instead of panicking.
        let _ = init_logger(false, true, None);
        let second = init_logger(true, false, None);
        assert!(second.is_err());
    }

    #[test]
    fn test_with_operation_span() {
        // Arrange
        let mut executed = false;

        // Act
        let result = with_operation_span("collect", || {
            executed = true;
            "collected"
        });

        // Assert
        assert!(executed);
        assert_eq!(result, "collected");
    }

    #[tokio::test]
    async fn test_phase_span_instruments_future() {
        let result = async {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            42
        }
        .instrument(phase_span("poll"))
        .await;

        assert_eq!(result, 42);
    }
}
