//! Logging initialization.
//!
//! Logs go to a file so they never draw over the TUI. Each run gets its
//! own file, e.g. `logs/rusty-console.2024-12-06-14-30-25.log`, next to
//! the executable unless another directory is given.
//!
//! The level comes from `RUST_LOG` (`debug`, `info`, `warn`, `error`),
//! defaulting to `info`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directory used when none is configured: `logs/` beside the executable,
/// or under the current directory if that cannot be determined.
pub fn default_log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// File name for a log started now.
pub fn log_file_name() -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    format!("rusty-console.{timestamp}.log")
}

/// Install the global subscriber writing to a fresh log file.
///
/// Returns the writer guard, which must be held until exit so buffered
/// lines are flushed. Returns `None` (logging disabled) when the log file
/// cannot be created; the console works without it.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let log_dir = log_dir.map(Path::to_path_buf).unwrap_or_else(default_log_dir);

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
        return None;
    }

    let log_path = log_dir.join(log_file_name());
    let log_file = match fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {}", e);
            return None;
        }
    };

    // Non-blocking so a slow disk never stalls the event loop
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: Logging already initialized: {}", e);
        return None;
    }

    tracing::info!("Logging initialized - writing to {}", log_path.display());
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name_shape() {
        let name = log_file_name();
        assert!(name.starts_with("rusty-console."));
        assert!(name.ends_with(".log"));
        // rusty-console. + YYYY-mm-dd-HH-MM-SS + .log
        assert_eq!(name.len(), "rusty-console.".len() + 19 + ".log".len());
    }

    #[test]
    fn test_default_log_dir_is_named_logs() {
        assert_eq!(default_log_dir().file_name().and_then(|n| n.to_str()), Some("logs"));
    }
}
