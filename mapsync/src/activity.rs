//! Human-readable activity log.
//!
//! The engine emits a [`LogEntry`] for every visible marker change. Hosts
//! forward entries to whatever sink they have; [`ActivityLog`] is the bounded
//! newest-first buffer the CLI and tests use.

#[cfg(test)]
#[path = "activity_test.rs"]
mod activity_test;

use std::collections::VecDeque;

use crate::consts::ACTIVITY_LOG_CAP;

/// Which marker change an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Add,
    Update,
    Delete,
}

impl LogKind {
    /// Glyph shown before the message.
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Update => "→",
            Self::Delete => "✕",
        }
    }
}

/// One activity-log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
    /// Host timestamp of the change.
    pub at_ms: f64,
}

impl LogEntry {
    #[must_use]
    pub fn appeared(name: &str, at_ms: f64) -> Self {
        Self { kind: LogKind::Add, message: format!("+ {name} appeared"), at_ms }
    }

    #[must_use]
    pub fn moved(name: &str, at_ms: f64) -> Self {
        Self { kind: LogKind::Update, message: format!("→ {name} moved"), at_ms }
    }

    #[must_use]
    pub fn removed(name: &str, at_ms: f64) -> Self {
        Self { kind: LogKind::Delete, message: format!("✕ {name} removed"), at_ms }
    }
}

/// Bounded log, newest entry first.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    cap: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_cap(ACTIVITY_LOG_CAP)
    }
}

impl ActivityLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cap(cap: usize) -> Self {
        Self { entries: VecDeque::with_capacity(cap), cap }
    }

    /// Prepend `entry`, evicting the oldest entry once the cap is reached.
    pub fn record(&mut self, entry: LogEntry) {
        if self.cap == 0 {
            return;
        }
        self.entries.push_front(entry);
        self.entries.truncate(self.cap);
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
