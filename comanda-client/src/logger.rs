//! Logging Infrastructure
//!
//! `tracing` subscriber setup for the POS client. `RUST_LOG` wins over the
//! level given here.

use crate::error::LoggerError;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
pub fn init_logger() -> Result<(), LoggerError> {
    init_logger_with_file(None, None)
}

/// Initialize the logger with optional daily-rolling file output.
///
/// The log directory is created if missing. Fails if a global subscriber is
/// already set.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) -> Result<(), LoggerError> {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("comanda_client={level},shared={level}")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    let result = match log_dir {
        Some(dir) => {
            let log_path = Path::new(dir);
            fs::create_dir_all(log_path)?;
            let file_appender = tracing_appender::rolling::daily(log_path, "comanda");
            subscriber.with_ansi(false).with_writer(file_appender).try_init()
        }
        None => subscriber.try_init(),
    };
    result.map_err(|e| LoggerError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_init_reports_error() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");

        // the first call may lose to another test's subscriber
        let _ = init_logger_with_file(Some("debug"), log_dir.to_str());
        assert!(log_dir.is_dir());

        assert!(matches!(init_logger(), Err(LoggerError::Init(_))));
    }
}
