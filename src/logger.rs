use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, Write};

use clap::ValueEnum;
use colored::*;
use serde::Serialize;

/// Console verbosity, ordered from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Log,
    Debug,
}

impl LogLevel {
    /// `--debug` wins over `--log-level`; the default is `Log`.
    pub fn from_flags(debug: bool, level: Option<LogLevel>) -> Self {
        if debug {
            LogLevel::Debug
        } else {
            level.unwrap_or(LogLevel::Log)
        }
    }
}

/// User-facing console logger.
///
/// Regular output goes to the `out` writer, errors and warnings to `err`.
/// Every line is indented by the number of open groups, two spaces each.
pub struct Logger {
    level: Cell<LogLevel>,
    depth: Cell<usize>,
    out: RefCell<Box<dyn Write>>,
    err: RefCell<Box<dyn Write>>,
}

impl Logger {
    pub fn new(level: LogLevel) -> Self {
        Self::with_writers(level, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(level: LogLevel, out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self {
            level: Cell::new(level),
            depth: Cell::new(0),
            out: RefCell::new(out),
            err: RefCell::new(err),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level.get()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.set(level);
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::None && level <= self.level.get()
    }

    /// Number of groups currently open.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Error, &format!("[ERROR] {message}"));
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Warn, &format!("[WARNING] {message}"));
    }

    pub fn log(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Log, &message.to_string());
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Debug, &format!("[DEBUG] {message}"));
    }

    /// Print `name` and indent everything logged until the returned guard
    /// is dropped.
    pub fn group(&self, name: impl Into<String>) -> LogGroup<'_> {
        let name = name.into();
        self.emit(LogLevel::Log, &name);
        self.depth.set(self.depth.get() + 1);
        LogGroup { logger: self, name }
    }

    fn group_end(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }

    fn emit(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }
        let indent = "  ".repeat(self.depth.get());
        let mut writer = match level {
            LogLevel::Error | LogLevel::Warn => self.err.borrow_mut(),
            _ => self.out.borrow_mut(),
        };
        for line in message.lines() {
            let styled = match level {
                LogLevel::Error => line.red(),
                LogLevel::Warn => line.yellow(),
                LogLevel::Debug => line.blue(),
                _ => line.normal(),
            };
            // Console output is best-effort, a closed pipe must not abort a run.
            let _ = writeln!(writer, "{indent}{styled}");
        }
        let _ = writer.flush();
    }
}

/// An open log group. Dropping it closes the group.
pub struct LogGroup<'a> {
    logger: &'a Logger,
    name: String,
}

impl Drop for LogGroup<'_> {
    fn drop(&mut self) {
        tracing::trace!(group = %self.name, "group end");
        self.logger.group_end();
    }
}
