//! Application constants
//!
//! Centralized location for table names, wire markers and column widths
//! shared by the orchestrator and the database adapters.

// Directory (primary) database
pub const DIRECTORY_TABLE: &str = "tb_SYNCDB_USERS";
pub const AUDIT_LOG_TABLE: &str = "tb_SYNC_LOG";

// Site databases
pub const TENANT_TABLE: &str = "tb_OGFMAIN";
pub const PAYMENT_TABLE: &str = "tb_OGFPAYMENT";
pub const ITEM_TABLE: &str = "tb_OGFITEMSALE";

/// Value of the `UPLOAD` column once a row has been delivered.
pub const UPLOADED_MARKER: &str = "T";

// Audit log column widths (characters)
pub const AUDIT_STATUS_WIDTH: usize = 10;
pub const AUDIT_MESSAGE_WIDTH: usize = 500;
pub const AUDIT_CONTEXT_WIDTH: usize = 1000;

/// Field in a tenant API response that carries the application-level result.
pub const RESPONSE_STATUS_FIELD: &str = "returnStatus";
/// Value of [`RESPONSE_STATUS_FIELD`] that signals a successful delivery.
pub const RESPONSE_STATUS_SUCCESS: &str = "Success";

/// OAuth grant used against every tenant token endpoint.
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

// Payload formatting
pub const RECEIPT_DATE_FORMAT: &str = "%d/%m/%Y";
pub const RECEIPT_TIME_FORMAT: &str = "%H:%M:%S";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DB_PORT: u16 = 1443;
