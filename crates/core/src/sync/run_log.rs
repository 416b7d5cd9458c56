//! Run-scoped log collector and the reporter that reduces it to one audit
//! record.

use chrono::Utc;
use possync_domain::{LogEntry, LogStatus, RunSummary};
use serde_json::{Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Append-only log of one run.
///
/// Created at run start, threaded by `&mut` through every stage, read by
/// [`summarize`] at the end. Every entry is mirrored to `tracing`.
#[derive(Debug)]
pub struct RunLog {
    run_id: Uuid,
    entries: Vec<LogEntry>,
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLog {
    /// Start an empty log with a fresh run id.
    pub fn new() -> Self {
        Self { run_id: Uuid::new_v4(), entries: Vec::new() }
    }

    /// Identifier shared by every tracing event of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Append an entry. Non-object contexts are wrapped as `{"value": ..}`.
    pub fn record(&mut self, status: LogStatus, message: impl Into<String>, context: Value) {
        let message = message.into();
        let context = match context {
            Value::Object(_) => context,
            Value::Null => Value::Object(Map::new()),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                Value::Object(map)
            }
        };

        let run_id = self.run_id;
        match status {
            LogStatus::Error => error!(%run_id, %status, %context, "{message}"),
            LogStatus::Warn => warn!(%run_id, %status, %context, "{message}"),
            LogStatus::Success | LogStatus::Info => {
                info!(%run_id, %status, %context, "{message}")
            }
        }

        self.entries.push(LogEntry { timestamp: Utc::now(), status, message, context });
    }

    /// Append an INFO entry.
    pub fn info(&mut self, message: impl Into<String>, context: Value) {
        self.record(LogStatus::Info, message, context);
    }

    /// Append a SUCCESS entry.
    pub fn success(&mut self, message: impl Into<String>, context: Value) {
        self.record(LogStatus::Success, message, context);
    }

    /// Append a WARN entry.
    pub fn warn(&mut self, message: impl Into<String>, context: Value) {
        self.record(LogStatus::Warn, message, context);
    }

    /// Append an ERROR entry.
    pub fn error(&mut self, message: impl Into<String>, context: Value) {
        self.record(LogStatus::Error, message, context);
    }

    /// Entries in the order they were recorded.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Consume the log, keeping its entries.
    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

/// Reduce a run log to the record persisted in the audit table.
///
/// Latest SUCCESS/ERROR entry wins; otherwise the latest WARN/INFO entry;
/// an empty log yields INFO "No logs found".
pub fn summarize(entries: &[LogEntry]) -> RunSummary {
    entries
        .iter()
        .rev()
        .find(|entry| entry.status.is_outcome())
        .or_else(|| entries.iter().rev().find(|entry| !entry.status.is_outcome()))
        .map(RunSummary::from)
        .unwrap_or_else(RunSummary::no_logs)
}
