//! Bounded, per-session diagnostic log.
//!
//! A [`SessionLog`] is owned by one workflow session. It is written to
//! explicitly (there is no global capture) and can be serialized into a
//! donation payload at the end of the session.

use std::{collections::VecDeque, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level,
            self.message
        )
    }
}

/// Ring buffer of session diagnostics; the oldest entry is dropped once full.
#[derive(Debug, Clone)]
pub struct SessionLog {
    buffer: VecDeque<LogEntry>,
    max_size: usize,
}

impl SessionLog {
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            buffer: VecDeque::with_capacity(max_size.min(DEFAULT_CAPACITY)),
            max_size,
        }
    }

    pub fn record(&mut self, level: LogLevel, message: impl Into<String>) {
        if self.buffer.len() >= self.max_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Error, message);
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Formatted lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.buffer.iter().map(ToString::to_string).collect()
    }

    /// JSON list of formatted lines, or `["no logs"]` when nothing was recorded.
    pub fn to_donation_json(&self) -> serde_json::Result<String> {
        if self.is_empty() {
            return serde_json::to_string(&["no logs"]);
        }
        serde_json::to_string(&self.lines())
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
