//! Logging system for memblk
//! Leveled log entries are retained in an in-memory buffer so the host
//! (and the test suite) can inspect what the device reported.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use lazy_static::lazy_static;
use spin::Mutex;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Convert log level to string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Module name
    pub module: String,
    /// Log message
    pub message: String,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(level: LogLevel, module: &str, message: &str) -> Self {
        Self {
            level,
            module: module.to_string(),
            message: message.to_string(),
        }
    }

    /// Format the log entry
    pub fn format(&self) -> String {
        format!("{:<8} {}: {}", self.level.as_str(), self.module, self.message)
    }
}

/// Logger state
pub struct Logger {
    /// Minimum log level to retain
    min_level: LogLevel,
    /// In-memory log buffer (for viewing later)
    log_buffer: Vec<LogEntry>,
    /// Maximum log buffer size
    max_buffer_size: usize,
}

impl Logger {
    /// Create a new logger
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Debug,
            log_buffer: Vec::new(),
            max_buffer_size: 1000,
        }
    }

    /// Set minimum log level
    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Log a message
    pub fn log(&mut self, level: LogLevel, module: &str, message: &str) {
        if level < self.min_level {
            return;
        }

        self.log_buffer.push(LogEntry::new(level, module, message));

        // Trim buffer if needed
        if self.log_buffer.len() > self.max_buffer_size {
            self.log_buffer.remove(0);
        }
    }

    /// Get all log entries
    pub fn entries(&self) -> &[LogEntry] {
        &self.log_buffer
    }

    /// Clear the log buffer
    pub fn clear(&mut self) {
        self.log_buffer.clear();
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

// Global logger instance
lazy_static! {
    static ref LOGGER: Mutex<Logger> = Mutex::new(Logger::new());
}

/// Log a debug message
pub fn debug(module: &str, message: &str) {
    LOGGER.lock().log(LogLevel::Debug, module, message);
}

/// Log an info message
pub fn info(module: &str, message: &str) {
    LOGGER.lock().log(LogLevel::Info, module, message);
}

/// Log a warning message
pub fn warning(module: &str, message: &str) {
    LOGGER.lock().log(LogLevel::Warning, module, message);
}

/// Log an error message
pub fn error(module: &str, message: &str) {
    LOGGER.lock().log(LogLevel::Error, module, message);
}

/// Set the global minimum log level
pub fn set_min_level(level: LogLevel) {
    LOGGER.lock().set_min_level(level);
}

/// Copy of the retained entries, oldest first
pub fn snapshot() -> Vec<LogEntry> {
    LOGGER.lock().entries().to_vec()
}

/// Drop all retained entries
pub fn clear() {
    LOGGER.lock().clear();
}
