//! Run bookkeeping: log entries, the audit summary and commit outcomes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{AUDIT_CONTEXT_WIDTH, AUDIT_MESSAGE_WIDTH, AUDIT_STATUS_WIDTH};

/// Severity of a run log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogStatus {
    Success,
    Error,
    Info,
    Warn,
}

impl LogStatus {
    /// Upper-case name as stored in the audit table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Info => "INFO",
            Self::Warn => "WARN",
        }
    }

    /// SUCCESS and ERROR entries describe an outcome; INFO and WARN describe
    /// progress.
    pub fn is_outcome(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the run-scoped log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub status: LogStatus,
    pub message: String,
    /// Always a JSON object (possibly empty)
    pub context: Value,
}

/// The single record a run persists to the audit table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: LogStatus,
    pub message: String,
    pub context: Value,
}

impl RunSummary {
    /// Summary used when a run recorded nothing.
    pub fn no_logs() -> Self {
        Self {
            status: LogStatus::Info,
            message: "No logs found".to_string(),
            context: Value::Object(serde_json::Map::new()),
        }
    }
}

impl From<&LogEntry> for RunSummary {
    fn from(entry: &LogEntry) -> Self {
        Self {
            status: entry.status,
            message: entry.message.clone(),
            context: entry.context.clone(),
        }
    }
}

/// Audit row with every column cut to its storage width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub status: String,
    pub message: String,
    pub context: String,
}

impl From<&RunSummary> for AuditRecord {
    fn from(summary: &RunSummary) -> Self {
        Self {
            status: truncate_chars(summary.status.as_str(), AUDIT_STATUS_WIDTH),
            message: truncate_chars(&summary.message, AUDIT_MESSAGE_WIDTH),
            context: truncate_chars(&summary.context.to_string(), AUDIT_CONTEXT_WIDTH),
        }
    }
}

/// Cut `value` to at most `width` characters without splitting a character.
pub fn truncate_chars(value: &str, width: usize) -> String {
    match value.char_indices().nth(width) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}

/// Rows touched by the upload-marking transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitCounts {
    pub payment_rows: u64,
    pub item_rows: u64,
}

/// Result of the commit step as reported to the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutcome {
    pub status: LogStatus,
    pub message: String,
    pub payment_rows_affected: u64,
    pub items_rows_affected: u64,
}

impl CommitOutcome {
    /// Whether the commit marked rows as uploaded.
    pub fn is_success(&self) -> bool {
        self.status == LogStatus::Success
    }
}

/// Responses and errors accumulated by one fan-out pass, plus its log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    pub api_responses: Vec<Value>,
    pub errors: Vec<String>,
    pub log_entries: Vec<LogEntry>,
}
