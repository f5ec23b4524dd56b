//! Console logger implementation

use super::traits::Logger;

/// A logger that writes to the console
///
/// All output goes to stderr so stdout stays machine-readable. Debug output is only
/// emitted when the logger was created as verbose, so `tapstack resolve`
/// stays quiet unless asked.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    verbose: bool,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a console logger with the default prefix
    pub fn new() -> Self {
        Self {
            prefix: "[TapStack]".to_string(),
            verbose: false,
        }
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            verbose: false,
        }
    }

    /// Enable or disable debug output
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        if self.verbose {
            eprintln!("{} DEBUG: {}", self.prefix, message);
        }
    }

    fn info(&self, message: &str) {
        eprintln!("{} INFO: {}", self.prefix, message);
    }

    fn warn(&self, message: &str) {
        eprintln!("{} WARN: {}", self.prefix, message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} ERROR: {}", self.prefix, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logger_creation() {
        let logger = ConsoleLogger::new();
        assert_eq!(logger.prefix, "[TapStack]");
        assert!(!logger.verbose);

        let custom = ConsoleLogger::with_prefix("[synth]").verbose(true);
        assert_eq!(custom.prefix, "[synth]");
        assert!(custom.verbose);
    }

    #[test]
    fn test_console_logger_logs() {
        let logger = ConsoleLogger::new().verbose(true);
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }
}
