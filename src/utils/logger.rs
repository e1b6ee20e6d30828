//! Logging setup
//!
//! Diagnostics go through the `log` facade to env_logger on stderr, so the
//! JSON printed on stdout stays clean. `Logger` is the separate operations
//! log: one line per completed command, appended to a file when configured.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use env_logger::{Builder, Env, Target};

use crate::config::LoggingSettings;

/// Operations log
pub struct Logger {
    /// File handle for log output, None when disabled
    file: Mutex<Option<File>>,
}

impl Logger {
    /// Creates a logger appending to `log_file`
    pub fn new(log_file: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(log_file)?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
        })
    }

    /// A logger that records nothing
    pub fn disabled() -> Self {
        Logger {
            file: Mutex::new(None),
        }
    }

    /// Logger for the configured `logging.file`, disabled when unset
    pub fn from_settings(settings: &LoggingSettings) -> io::Result<Self> {
        match &settings.file {
            Some(path) => Logger::new(path),
            None => Ok(Logger::disabled()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.lock().map(|f| f.is_some()).unwrap_or(false)
    }

    /// Append one line, prefixed with the Unix time in seconds
    pub fn log(&self, message: &str) -> io::Result<()> {
        let mut guard = self.file.lock()
            .map_err(|_| io::Error::other("operations log lock poisoned"))?;
        if let Some(file) = guard.as_mut() {
            let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
            writeln!(file, "{} {}", now, message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Static method to initialize the global logger
    ///
    /// The level is `warn` by default, `debug` with `verbose`, else the
    /// configured filter. `RUST_LOG` overrides all of them.
    pub fn init_global_logger(level: Option<&str>, verbose: bool) {
        let default_filter = if verbose { "debug" } else { level.unwrap_or("warn") };

        let mut builder = Builder::new();
        builder.parse_filters(default_filter);
        builder.parse_env(Env::default());
        builder.target(Target::Stderr);

        if builder.try_init().is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_operations_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ops.log");

        let logger = Logger::new(&path).unwrap();
        logger.log("lookup Berlin -> 9.1").unwrap();
        drop(logger);
        Logger::new(&path).unwrap().log("inspect soil.tif").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" lookup Berlin -> 9.1"));
        assert!(lines[1].ends_with(" inspect soil.tif"));
    }

    #[test]
    fn test_disabled_logger() {
        let logger = Logger::disabled();
        assert!(!logger.is_enabled());
        assert!(logger.log("ignored").is_ok());
    }
}
