//! Primary (directory) database: site directory, upload commit and audit log.

use async_trait::async_trait;
use possync_core::{PrimaryConnector, PrimaryStore};
use possync_domain::constants::{AUDIT_LOG_TABLE, UPLOADED_MARKER};
use possync_domain::{
    AuditRecord, CommitCounts, DatabaseConfig, DirectoryEntry, PosSyncError, Result, RunSummary,
};
use tokio_postgres::Client;
use tracing::{debug, instrument};

use super::connection::{open, pg_config};
use super::map_pg_error;

/// Opens connections to the primary database named in the configuration.
#[derive(Clone)]
pub struct PgPrimaryConnector {
    settings: DatabaseConfig,
}

impl PgPrimaryConnector {
    /// Create a connector for the primary database in `settings`.
    pub fn new(settings: DatabaseConfig) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl PrimaryConnector for PgPrimaryConnector {
    #[instrument(skip(self), fields(server = %self.settings.server))]
    async fn connect(&self) -> Result<Box<dyn PrimaryStore>> {
        let config = pg_config(
            &self.settings,
            &self.settings.server,
            self.settings.port,
            &self.settings.primary_database,
        );
        let client = open(&self.settings, &config).await?;
        debug!("connected to primary database");
        Ok(Box::new(PgPrimaryStore::new(client)))
    }

    fn server(&self) -> String {
        self.settings.server.clone()
    }
}

/// Live primary database connection.
pub struct PgPrimaryStore {
    client: Client,
}

impl PgPrimaryStore {
    /// Wrap an open client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PrimaryStore for PgPrimaryStore {
    async fn list_site_connections(&self) -> Result<Vec<DirectoryEntry>> {
        let rows = self
            .client
            .query(DIRECTORY_SELECT_SQL, &[])
            .await
            .map_err(|err| map_pg_error("directory.list", err))?;

        rows.iter()
            .map(|row| {
                Ok(DirectoryEntry {
                    ip: row.try_get(0).map_err(|err| map_pg_error("directory.ip", err))?,
                    port: row.try_get(1).map_err(|err| map_pg_error("directory.port", err))?,
                })
            })
            .collect()
    }

    /// Both updates run in one transaction; returning early drops it, which
    /// rolls back.
    #[instrument(skip(self))]
    async fn commit_uploads(&mut self) -> Result<CommitCounts> {
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|err| map_pg_error("commit.begin", err))?;

        let payment_rows = tx
            .execute(PAYMENT_MARK_UPLOADED_SQL, &[&UPLOADED_MARKER])
            .await
            .map_err(|err| map_pg_error("commit.payments", err))?;
        let item_rows = tx
            .execute(ITEM_MARK_UPLOADED_SQL, &[&UPLOADED_MARKER])
            .await
            .map_err(|err| map_pg_error("commit.items", err))?;

        tx.commit().await.map_err(|err| map_pg_error("commit.commit", err))?;

        debug!(payment_rows, item_rows, "upload markers committed");
        Ok(CommitCounts { payment_rows, item_rows })
    }

    async fn record_audit(&self, summary: &RunSummary) -> Result<()> {
        let record = AuditRecord::from(summary);

        let inserted = self
            .client
            .execute(AUDIT_INSERT_SQL, &[&record.status, &record.message, &record.context])
            .await
            .map_err(|err| map_pg_error("audit.insert", err))?;

        if inserted != 1 {
            return Err(PosSyncError::Database(format!(
                "audit insert affected {inserted} rows"
            )));
        }
        debug!(table = AUDIT_LOG_TABLE, status = %record.status, "run summary recorded");
        Ok(())
    }
}

const DIRECTORY_SELECT_SQL: &str = "SELECT ip, port FROM tb_SYNCDB_USERS";

const PAYMENT_MARK_UPLOADED_SQL: &str =
    "UPDATE tb_OGFPAYMENT SET upload = $1 WHERE upload IS NULL OR upload <> $1";

const ITEM_MARK_UPLOADED_SQL: &str =
    "UPDATE tb_OGFITEMSALE SET upload = $1 WHERE upload IS NULL OR upload <> $1";

const AUDIT_INSERT_SQL: &str =
    "INSERT INTO tb_SYNC_LOG (status, message, context) VALUES ($1, $2, $3)";
