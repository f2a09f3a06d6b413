//! Notification channel - transient status and error messages

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::events::{EventSink, UiEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Success => "✓",
            Self::Warning => "⚠",
            Self::Error => "✗",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub at: DateTime<Local>,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Local::now(),
        }
    }
}

/// Every notification is also written to the log at the matching level
#[derive(Debug, Clone)]
pub struct Notifier {
    sink: EventSink,
}

impl Notifier {
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Level::Success, message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(Level::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Level::Error, message.into());
    }

    fn push(&self, level: Level, message: String) {
        match level {
            Level::Info | Level::Success => info!(notification = %message),
            Level::Warning => warn!(notification = %message),
            Level::Error => error!(notification = %message),
        }
        self.sink.emit(UiEvent::Notify(Notification::new(level, message)));
    }
}
