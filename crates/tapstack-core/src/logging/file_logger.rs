//! Debug trail written to a file
//!
//! When switched on, context loading, synthesis and verification append to
//! `$TMPDIR/tapstack-debug.log` so a quiet CLI run can be inspected after the
//! fact. Configuration resolution never writes here; it reports through the
//! `SharedLogger` it was given.
//!
//! - `TAPSTACK_DEBUG`: `1`/`true` enables (default off, no file is created)
//! - `TAPSTACK_LOG_LEVEL`: `trace|debug|info|warn|error` (default `debug`)

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

struct FileLoggerState {
    file: Option<File>,
    min_level: LogLevel,
    enabled: bool,
}

impl FileLoggerState {
    fn new() -> Self {
        let enabled = trail_enabled(std::env::var("TAPSTACK_DEBUG").ok().as_deref());
        let min_level = std::env::var("TAPSTACK_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);

        // Don't create the file at all when the trail is switched off
        let file = if enabled {
            Self::open(&Self::default_log_path())
        } else {
            None
        };

        Self { file, min_level, enabled }
    }

    fn open(path: &Path) -> Option<File> {
        OpenOptions::new().create(true).append(true).open(path).ok()
    }

    fn default_log_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push("tapstack-debug.log");
        path
    }

    fn write(&mut self, level: LogLevel, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }

        if let Some(ref mut file) = self.file {
            let timestamp = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| {
                    let secs = d.as_secs();
                    format!(
                        "{:02}:{:02}:{:02}.{:03}",
                        (secs % 86400) / 3600,
                        (secs % 3600) / 60,
                        secs % 60,
                        d.subsec_millis()
                    )
                })
                .unwrap_or_else(|_| "??:??:??.???".to_string());

            let _ = writeln!(file, "[{}] [{}] [{}] {}", timestamp, level, module, message);
            let _ = file.flush();
        }
    }
}

/// Whether a `TAPSTACK_DEBUG` value switches the trail on
fn trail_enabled(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some(v) if v == "1" || v.eq_ignore_ascii_case("true"))
}

static LOGGER: OnceLock<Mutex<FileLoggerState>> = OnceLock::new();

fn get_logger() -> &'static Mutex<FileLoggerState> {
    LOGGER.get_or_init(|| Mutex::new(FileLoggerState::new()))
}

/// Log a message at the specified level
pub fn log(level: LogLevel, module: &str, message: &str) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.write(level, module, message);
    }
}

pub fn trace(module: &str, message: &str) {
    log(LogLevel::Trace, module, message);
}

pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

pub fn error(module: &str, message: &str) {
    log(LogLevel::Error, module, message);
}

#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::logging::file_logger::debug(module_path!(), &format!($($arg)*))
    };
}

/// Path of the debug trail
pub fn log_file_path() -> PathBuf {
    FileLoggerState::default_log_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels_ordered() {
        assert!(LogLevel::Debug > LogLevel::Trace);
        assert!(LogLevel::Info > LogLevel::Debug);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Error > LogLevel::Warn);
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!(LogLevel::parse("TRACE"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse(" warning "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_trail_is_opt_in() {
        assert!(!trail_enabled(None));
        assert!(!trail_enabled(Some("")));
        assert!(!trail_enabled(Some("0")));
        assert!(!trail_enabled(Some("false")));
        assert!(trail_enabled(Some("1")));
        assert!(trail_enabled(Some(" TRUE ")));
    }

    #[test]
    fn test_logging_does_not_panic() {
        debug("test", "test message");
        info("test", "test message");
        warn("test", "test message");
        error("test", "test message");
    }

    #[test]
    fn test_log_path_name() {
        assert!(log_file_path().ends_with("tapstack-debug.log"));
    }
}
