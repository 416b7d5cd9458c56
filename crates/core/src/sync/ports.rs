//! Port interfaces for sync operations
//!
//! Database ports are split into a connector and the store it opens. A store
//! is a live connection: the orchestrator holds at most one at a time and
//! drops it before opening the next.

use async_trait::async_trait;
use chrono::NaiveDate;
use possync_domain::{
    CommitCounts, DirectoryEntry, ItemRecord, PaymentLine, RemoteError, Result, RunSummary,
    SiteConnection, TenantConfig,
};
use serde_json::Value;

/// Opens connections to the primary (directory) database
#[async_trait]
pub trait PrimaryConnector: Send + Sync {
    /// Open a new connection to the primary database
    async fn connect(&self) -> Result<Box<dyn PrimaryStore>>;

    /// Server name used in log context
    fn server(&self) -> String;
}

/// Live connection to the primary database
#[async_trait]
pub trait PrimaryStore: Send + Sync {
    /// Read every row of the directory table
    async fn list_site_connections(&self) -> Result<Vec<DirectoryEntry>>;

    /// Mark all unmarked payment and item rows as uploaded in one
    /// transaction. Any failure leaves both tables untouched.
    async fn commit_uploads(&mut self) -> Result<CommitCounts>;

    /// Persist the run summary to the audit table
    async fn record_audit(&self, summary: &RunSummary) -> Result<()>;
}

/// Opens connections to site databases
#[async_trait]
pub trait SiteConnector: Send + Sync {
    /// Open a connection to the site database at `site`
    async fn connect(&self, site: &SiteConnection) -> Result<Box<dyn SiteStore>>;
}

/// Live connection to one site database
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Read every tenant configuration row
    async fn list_tenant_configs(&self) -> Result<Vec<TenantConfig>>;

    /// Read every payment row not yet marked as uploaded
    async fn list_payment_lines(&self) -> Result<Vec<PaymentLine>>;

    /// Read the unuploaded items of one receipt
    async fn list_items(&self, receipt_date: NaiveDate, receipt_no: &str)
        -> Result<Vec<ItemRecord>>;
}

/// Exchanges tenant client credentials for a bearer token
#[async_trait]
pub trait TokenBroker: Send + Sync {
    /// Fetch a bearer token for `tenant`.
    async fn access_token(&self, tenant: &TenantConfig) -> std::result::Result<String, RemoteError>;
}

/// Posts a pre-serialized payload to a tenant API
#[async_trait]
pub trait TenantDispatcher: Send + Sync {
    /// Send `body` verbatim with bearer `token`; returns the parsed response
    /// body.
    async fn dispatch(
        &self,
        tenant: &TenantConfig,
        body: &str,
        token: &str,
    ) -> std::result::Result<Value, RemoteError>;
}
