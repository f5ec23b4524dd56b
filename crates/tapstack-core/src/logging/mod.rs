//! Logging for configuration resolution and stack planning
//!
//! Callers hand a `SharedLogger` to the resolver and planner; the global
//! `file_logger` records a debug trail independent of whichever logger the
//! caller chose.

mod traits;
mod noop;
mod console;
mod memory;
pub mod file_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::{MemoryLogger, LogRecord};

pub use file_logger::{
    log, trace, debug, info, warn, error,
    log_file_path, LogLevel,
};
