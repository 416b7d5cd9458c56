//! Domain types and models

pub mod run;
pub mod sales;

pub use run::{
    truncate_chars, AuditRecord, CommitCounts, CommitOutcome, LogEntry, LogStatus, RunResult,
    RunSummary,
};
pub use sales::{
    DirectoryEntry, ItemRecord, PaymentLine, PaymentRecord, PosSale, SiteConnection,
    SiteRejection, TenantConfig, TenantPayload,
};
