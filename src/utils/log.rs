// src/utils/log.rs

//! Console reporting for check cycles.
//!
//! Produces the structured stdout lines a log tail follows while the
//! monitor runs in the background. Output is flushed after every line so
//! the log file is accurate even when the process is killed mid-cycle.
//! Diagnostic logging for library internals goes through the `log` crate
//! instead.

use std::io::Write;
use std::sync::OnceLock;

use chrono::Local;

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Current log level
static LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Initialize the console reporting level.
pub fn init(level: &str) {
    let _ = LOG_LEVEL.set(LogLevel::from_str(level));
}

/// Check if a log level should be displayed
fn should_log(level: LogLevel) -> bool {
    let current = LOG_LEVEL.get().copied().unwrap_or(LogLevel::Info);
    level >= current
}

/// Format a log message with timestamp and level
fn format_log(level: LogLevel, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level.as_str(), message)
}

/// Print a line to stdout and flush immediately.
fn emit(level: LogLevel, message: &str) {
    if should_log(level) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", format_log(level, message));
        let _ = out.flush();
    }
}

/// Log an info message
pub fn info(message: &str) {
    emit(LogLevel::Info, message);
}

/// Log a warning message
pub fn warn(message: &str) {
    emit(LogLevel::Warn, message);
}

/// Log an error message
pub fn error(message: &str) {
    emit(LogLevel::Error, message);
}

/// Log a success message (always shown as INFO)
pub fn success(message: &str) {
    emit(LogLevel::Info, message);
}

/// Log a header
pub fn header(title: &str) {
    if should_log(LogLevel::Info) {
        let border = "═".repeat(60);
        emit(LogLevel::Info, &border);
        emit(LogLevel::Info, &format!("  {}", title));
        emit(LogLevel::Info, &border);
    }
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    emit(LogLevel::Info, &format!("    {}", message));
}

/// Log a separator line
pub fn separator() {
    emit(LogLevel::Info, &"─".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from_str("unknown"), LogLevel::Info);
    }
}
