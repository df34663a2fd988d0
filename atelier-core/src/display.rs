//! Console output.
//!
//! All human-facing output funnels through `emit` so verbosity is applied
//! in one place. `ConsoleSink` adapts this to the `EventSink` port so the
//! workflow can narrate without knowing about terminals.

use std::io::Write;

use atelier_kernel::ports::EventSink;
use colored::Colorize;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

static VERBOSITY: Lazy<RwLock<Verbosity>> = Lazy::new(|| RwLock::new(Verbosity::Normal));

pub fn set_verbosity(verbosity: Verbosity) {
    *VERBOSITY.write() = verbosity;
}

pub fn current_verbosity() -> Verbosity {
    *VERBOSITY.read()
}

fn suppressed(level: LogLevel) -> bool {
    match current_verbosity() {
        Verbosity::Quiet => !matches!(level, LogLevel::Error),
        Verbosity::Normal => matches!(level, LogLevel::Debug),
        Verbosity::Debug => false,
    }
}

pub fn emit(level: LogLevel, message: &str) {
    if suppressed(level) {
        return;
    }

    let line = match level {
        LogLevel::Debug => message.dimmed().to_string(),
        LogLevel::Info => message.to_string(),
        LogLevel::Warn => format!("{} {}", "warning:".yellow().bold(), message),
        LogLevel::Error => format!("{} {}", "error:".red().bold(), message),
    };

    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{line}");
}

pub fn debug(message: &str) {
    emit(LogLevel::Debug, message);
}

pub fn info(message: &str) {
    emit(LogLevel::Info, message);
}

pub fn warn(message: &str) {
    emit(LogLevel::Warn, message);
}

pub fn error(message: &str) {
    emit(LogLevel::Error, message);
}

pub fn step_start(name: &str) {
    emit(LogLevel::Info, &format!("{} {name}", "▶".cyan()));
}

pub fn step_end(name: &str, ok: bool) {
    if ok {
        emit(LogLevel::Info, &format!("{} {name}", "✓".green()));
    } else {
        emit(LogLevel::Warn, &format!("{name} did not complete"));
    }
}

/// Terminal-backed sink: narration goes to stderr, streamed generation
/// chunks only show up at debug verbosity.
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn info(&self, message: &str) {
        info(message);
    }

    fn warn(&self, message: &str) {
        warn(message);
    }

    fn progress(&self, message: &str) {
        if current_verbosity() == Verbosity::Debug {
            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "{}", message.dimmed());
            let _ = stderr.flush();
        }
    }

    fn step_start(&self, name: &str) {
        step_start(name);
    }

    fn step_end(&self, name: &str, ok: bool) {
        step_end(name, ok);
    }
}

/// Captures everything for assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events.lock().iter().any(|e| e.contains(needle))
    }
}

impl EventSink for RecordingSink {
    fn info(&self, message: &str) {
        self.events.lock().push(format!("info: {message}"));
    }

    fn warn(&self, message: &str) {
        self.events.lock().push(format!("warn: {message}"));
    }

    fn progress(&self, message: &str) {
        self.events.lock().push(format!("progress: {message}"));
    }

    fn step_start(&self, name: &str) {
        self.events.lock().push(format!("step: {name}"));
    }

    fn step_end(&self, name: &str, ok: bool) {
        let verdict = if ok { "done" } else { "failed" };
        self.events.lock().push(format!("step {verdict}: {name}"));
    }
}
