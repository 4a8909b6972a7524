//! Server event log panel

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the solver's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// `YYYY-MM-DD HH:MM:SS.mmm`
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub details: Value,
}

/// Render `entry` as `"{time} {type}: {details}"`.
///
/// Only the second space-separated field of the timestamp, the time of day,
/// is kept; anything after it is dropped. A timestamp without a space is
/// shown whole. Structured details are printed as compact JSON, plain strings
/// as-is.
#[must_use]
pub fn format_log_entry(entry: &LogEntry) -> String {
    let time = entry
        .timestamp
        .split(' ')
        .nth(1)
        .unwrap_or(entry.timestamp.as_str());
    let details = match &entry.details {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    format!("{time} {}: {details}", entry.kind)
}

/// Formatted log lines, replaced wholesale on every poll.
#[derive(Debug, Clone, Default)]
pub struct LogPanel {
    lines: Vec<String>,
}

impl LogPanel {
    pub fn replace(&mut self, entries: &[LogEntry]) {
        self.lines = entries.iter().map(format_log_entry).collect();
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
