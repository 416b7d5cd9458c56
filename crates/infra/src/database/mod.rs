//! PostgreSQL implementations of the database ports

pub mod connection;
pub mod primary_repository;
pub mod site_repository;

pub use primary_repository::{PgPrimaryConnector, PgPrimaryStore};
pub use site_repository::{PgSiteConnector, PgSiteStore};

use possync_domain::PosSyncError;
use tracing::warn;

use crate::errors::InfraError;

/// Tables, written with the same unquoted names the queries use.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

fn map_pg_error(op: &'static str, err: tokio_postgres::Error) -> PosSyncError {
    warn!(op, error = %err, "database operation failed");
    PosSyncError::from(InfraError::from(err))
}
