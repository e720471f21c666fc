//! Logging configuration for nodeshell.
//!
//! Logs go to stderr by default so stdout carries only command output, and only
//! warnings and errors show unless `RUST_LOG` says otherwise. With `--log-file`
//! they go to a file under the platform state directory at `info` instead.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default level on stderr, where logs share the terminal with command output.
const STDERR_LEVEL: &str = "warn";
/// Default level for `--log-file`.
const FILE_LEVEL: &str = "info";

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initializes logging to a file.
///
/// Location: `~/.local/state/nodeshell/nodeshell.log` on Linux (XDG state
/// directory), or the platform-appropriate state/config directory elsewhere.
/// Falls back to stderr if the file cannot be created.
pub fn init_file_logging() {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            init_stderr_logging();
            return;
        }
    }

    // Truncate on each run to avoid unbounded growth
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            init_stderr_logging();
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(FILE_LEVEL))
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Initializes logging to stderr.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(STDERR_LEVEL))
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the path for the log file.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("nodeshell").join("nodeshell.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("nodeshell").join("nodeshell.log");
    }

    std::env::temp_dir().join("nodeshell.log")
}
