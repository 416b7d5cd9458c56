//! Tracing subscriber setup and run-level log helpers.

use anyhow::anyhow;
use possync_core::RunReport;
use possync_domain::{LogStatus, PosSyncError};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_VAR: &str = "POSSYNC_LOG_FORMAT";

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON lines; anything else is human output.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }

    /// Format selected by `POSSYNC_LOG_FORMAT`.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_VAR).map(|value| Self::parse(&value)).unwrap_or(Self::Pretty)
    }
}

/// Install the global subscriber: `RUST_LOG` filter (default `info`),
/// format from `POSSYNC_LOG_FORMAT`.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match LogFormat::from_env() {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Pretty => builder.try_init(),
    }
    .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

/// Convert a `PosSyncError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &PosSyncError) -> &'static str {
    match error {
        PosSyncError::Database(_) => "database",
        PosSyncError::Config(_) => "config",
        PosSyncError::Network(_) => "network",
        PosSyncError::Auth(_) => "auth",
        PosSyncError::NotFound(_) => "not_found",
        PosSyncError::InvalidInput(_) => "invalid_input",
        PosSyncError::Internal(_) => "internal",
    }
}

/// Emit one event describing how a run ended, at the level of its summary.
pub fn log_run_report(report: &RunReport) {
    let responses = report.result.api_responses.len();
    let errors = report.result.errors.len();
    let (payment_rows, item_rows) = report
        .commit
        .as_ref()
        .map(|c| (c.payment_rows_affected, c.items_rows_affected))
        .unwrap_or_default();
    let summary = &report.summary;

    match summary.status {
        LogStatus::Error => error!(
            responses,
            errors,
            payment_rows,
            item_rows,
            summary = %summary.message,
            "sync run finished"
        ),
        LogStatus::Warn => warn!(
            responses,
            errors,
            payment_rows,
            item_rows,
            summary = %summary.message,
            "sync run finished"
        ),
        LogStatus::Success | LogStatus::Info => info!(
            responses,
            errors,
            payment_rows,
            item_rows,
            summary = %summary.message,
            "sync run finished"
        ),
    }
}
