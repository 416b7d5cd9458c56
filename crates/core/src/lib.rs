//! # POS Sync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for databases, the token endpoint and tenant
//!   APIs
//! - Payment aggregation and payload assembly
//! - The run-scoped log and its reporter
//! - The `SyncService` orchestrator
//!
//! ## Architecture Principles
//! - Only depends on `possync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod sync;

pub use sync::ports::{
    PrimaryConnector, PrimaryStore, SiteConnector, SiteStore, TenantDispatcher, TokenBroker,
};
pub use sync::run_log::{summarize, RunLog};
pub use sync::service::{RunReport, SyncService};
