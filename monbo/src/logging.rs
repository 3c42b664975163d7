//! Logging infrastructure for monbo.
//!
//! - Writes to `~/.monbo/monbo.log` by default (cleared on each run)
//! - Optionally mirrors events to stderr so stdout stays free for command output
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file and
/// installs a file layer plus an optional console layer.
///
/// # Arguments
///
/// * `log_dir` - Directory for the log file
/// * `log_file` - Log filename (e.g., "monbo.log")
/// * `console_enabled` - Also print events to stderr
/// * `debug` - Default level `debug` instead of `info` when RUST_LOG is unset
///
/// # Errors
///
/// Returns error if log directory cannot be created or log file cannot be cleared
pub fn init_logging(
    log_dir: &Path,
    log_file: &str,
    console_enabled: bool,
    debug: bool,
) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;
    fs::write(log_dir.join(log_file), "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let console_layer = console_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(true)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Get default log directory path (~/.monbo).
pub fn default_log_dir() -> PathBuf {
    crate::config::config_directory()
}

/// Get default log file name.
pub fn default_log_file() -> &'static str {
    "monbo.log"
}

/// Splits a log file path into directory and file name.
///
/// A bare file name resolves to the current directory.
pub fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| default_log_file().to_string());
    (dir, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        assert_eq!(default_log_file(), "monbo.log");
        assert!(default_log_dir().ends_with(".monbo"));
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false), "info");
        assert_eq!(default_level(true), "debug");
    }

    #[test]
    fn test_split_log_path() {
        let (dir, file) = split_log_path(Path::new("/var/log/monbo/run.log"));
        assert_eq!(dir, PathBuf::from("/var/log/monbo"));
        assert_eq!(file, "run.log");

        let (dir, file) = split_log_path(Path::new("run.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, "run.log");
    }

    #[test]
    fn test_clears_existing_file() {
        // init_logging installs a global subscriber, so only the file handling is exercised
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("nested").join("monbo.log");
        fs::create_dir_all(log_path.parent().unwrap()).unwrap();
        fs::write(&log_path, "old log data").unwrap();

        fs::write(&log_path, "").unwrap();
        assert_eq!(
            fs::read_to_string(&log_path).unwrap(),
            "",
            "Log file should be cleared"
        );
    }
}
