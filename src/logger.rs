//! Run logging.
//!
//! The engine and the checker context log through an injected `Logger`
//! reference instead of a process-wide facility, so library consumers and
//! tests can observe or silence the run without touching global state.

use std::cell::RefCell;

/// Verbosity levels for run output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only show errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
    /// Show all available debugging information
    Debug,
}

/// Severity of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Info,
    Debug,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Error => "ERROR",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        };
        f.write_str(s)
    }
}

/// Sink for run diagnostics, injected through the execution context
pub trait Logger {
    fn log(&self, level: LogLevel, message: &str);

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
}

/// Logger writing to stderr with configurable verbosity
pub struct StderrLogger {
    verbosity: VerbosityLevel,
}

impl StderrLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self { verbosity }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Error => true,
            LogLevel::Info => self.verbosity >= VerbosityLevel::Normal,
            LogLevel::Debug => self.verbosity >= VerbosityLevel::Verbose,
        }
    }
}

impl Logger for StderrLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if self.enabled(level) {
            eprintln!("[{}] {}", level, message);
        }
    }
}

/// One captured log record
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Logger capturing records in memory, for tests and embedding
#[derive(Default)]
pub struct MemoryLogger {
    records: RefCell<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.borrow().clone()
    }

    /// Messages of all captured records at the given level
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.messages_at(LogLevel::Error).len()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.records.borrow_mut().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}
