//! Progress and log events emitted while a merge runs.
//!
//! The core calls the reporter synchronously, once per row for progress.
//! Throttling and display belong to the reporter implementation.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Match,
    Merge,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Match => "match",
            Phase::Merge => "merge",
        }
    }
}

/// Emitted after each row is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    /// Rows processed so far (1-based).
    pub current: usize,
    pub total: usize,
    /// Running matched count. Only set during the match phase.
    pub matched: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
}

/// Sink for progress and narration.
pub trait Reporter {
    fn progress(&mut self, event: ProgressEvent);

    fn log(&mut self, event: LogEvent);

    fn info(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.log(LogEvent { level: LogLevel::Info, message: message.into() });
    }

    fn success(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.log(LogEvent { level: LogLevel::Success, message: message.into() });
    }

    fn warning(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.log(LogEvent { level: LogLevel::Warning, message: message.into() });
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn progress(&mut self, event: ProgressEvent) {
        (**self).progress(event);
    }

    fn log(&mut self, event: LogEvent) {
        (**self).log(event);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn progress(&mut self, _event: ProgressEvent) {}

    fn log(&mut self, _event: LogEvent) {}
}

/// Forwards narration to the `log` facade. Progress goes out at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn progress(&mut self, event: ProgressEvent) {
        log::trace!(
            "{} {}/{} (matched: {:?})",
            event.phase.as_str(),
            event.current,
            event.total,
            event.matched
        );
    }

    fn log(&mut self, event: LogEvent) {
        match event.level {
            LogLevel::Info | LogLevel::Success => log::info!("{}", event.message),
            LogLevel::Warning => log::warn!("{}", event.message),
            LogLevel::Error => log::error!("{}", event.message),
        }
    }
}

/// Simple event collector for testing.
#[derive(Debug, Default)]
pub struct EventCollector {
    progress: Vec<ProgressEvent>,
    logs: Vec<LogEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress_events(&self) -> &[ProgressEvent] {
        &self.progress
    }

    pub fn log_events(&self) -> &[LogEvent] {
        &self.logs
    }

    /// Progress events for one phase only.
    pub fn phase(&self, phase: Phase) -> Vec<&ProgressEvent> {
        self.progress.iter().filter(|e| e.phase == phase).collect()
    }

    /// Log messages at `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<&str> {
        self.logs
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn clear(&mut self) {
        self.progress.clear();
        self.logs.clear();
    }
}

impl Reporter for EventCollector {
    fn progress(&mut self, event: ProgressEvent) {
        self.progress.push(event);
    }

    fn log(&mut self, event: LogEvent) {
        self.logs.push(event);
    }
}
