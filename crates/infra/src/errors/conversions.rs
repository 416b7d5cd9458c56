//! Conversions from external infrastructure errors into domain errors.

use std::error::Error as _;

use possync_domain::PosSyncError;
use reqwest::Error as HttpError;
use tokio_postgres::error::SqlState;
use tokio_postgres::Error as PgError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PosSyncError);

impl From<InfraError> for PosSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PosSyncError> for InfraError {
    fn from(value: PosSyncError) -> Self {
        InfraError(value)
    }
}

trait IntoPosSyncError {
    fn into_possync(self) -> PosSyncError;
}

/* -------------------------------------------------------------------------- */
/* tokio_postgres::Error → PosSyncError */
/* -------------------------------------------------------------------------- */

impl IntoPosSyncError for PgError {
    fn into_possync(self) -> PosSyncError {
        if let Some(db) = self.as_db_error() {
            let code = db.code();
            let message = db.message();

            return if *code == SqlState::INVALID_PASSWORD
                || *code == SqlState::INVALID_AUTHORIZATION_SPECIFICATION
            {
                PosSyncError::Auth(format!("database rejected credentials: {message}"))
            } else if *code == SqlState::UNDEFINED_TABLE || *code == SqlState::UNDEFINED_COLUMN {
                PosSyncError::Database(format!("schema mismatch: {message}"))
            } else if *code == SqlState::T_R_SERIALIZATION_FAILURE
                || *code == SqlState::T_R_DEADLOCK_DETECTED
            {
                PosSyncError::Database(format!("transaction conflict: {message}"))
            } else {
                PosSyncError::Database(format!("{} ({}): {message}", db.severity(), code.code()))
            };
        }

        if self.is_closed() {
            return PosSyncError::Database("database connection closed".into());
        }

        if let Some(io) = self.source().and_then(|cause| cause.downcast_ref::<std::io::Error>()) {
            return PosSyncError::Network(format!("database connection failed: {io}"));
        }

        PosSyncError::Database(self.to_string())
    }
}

impl From<PgError> for InfraError {
    fn from(value: PgError) -> Self {
        InfraError(value.into_possync())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PosSyncError */
/* -------------------------------------------------------------------------- */

impl IntoPosSyncError for HttpError {
    fn into_possync(self) -> PosSyncError {
        if self.is_timeout() {
            return PosSyncError::Network("HTTP request timed out".into());
        }

        if self.is_builder() {
            return PosSyncError::Config(format!("invalid HTTP client configuration: {self}"));
        }

        if self.is_connect() {
            return PosSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => PosSyncError::Auth(message),
                404 => PosSyncError::NotFound(message),
                400..=499 => PosSyncError::InvalidInput(message),
                _ => PosSyncError::Network(message),
            };
        }

        PosSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_possync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
