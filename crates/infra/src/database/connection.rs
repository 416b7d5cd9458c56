//! Opening tokio-postgres connections.
//!
//! Each call opens one dedicated connection and spawns its driver task. The
//! returned [`Client`] owns the connection: dropping it closes the socket
//! and ends the driver.

use std::time::Duration;

use native_tls::TlsConnector;
use possync_domain::{DatabaseConfig, PosSyncError, Result};
use postgres_native_tls::MakeTlsConnector;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_postgres::{Client, Config as PgConfig, Connection, NoTls};
use tracing::{debug, warn};

use crate::errors::InfraError;

const APPLICATION_NAME: &str = "possync";

/// Connection parameters for `database` on `host:port`, using the shared
/// credentials in `settings`.
pub fn pg_config(settings: &DatabaseConfig, host: &str, port: u16, database: &str) -> PgConfig {
    let mut config = PgConfig::new();
    config
        .host(host)
        .port(port)
        .user(&settings.user)
        .password(&settings.password)
        .dbname(database)
        .application_name(APPLICATION_NAME)
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs));
    config
}

/// Open a connection, with TLS when `settings.encrypt` is set.
///
/// `trust_server_certificate` disables certificate and hostname checks.
pub async fn open(settings: &DatabaseConfig, config: &PgConfig) -> Result<Client> {
    if settings.encrypt {
        let connector = TlsConnector::builder()
            .danger_accept_invalid_certs(settings.trust_server_certificate)
            .danger_accept_invalid_hostnames(settings.trust_server_certificate)
            .build()
            .map_err(|err| PosSyncError::Config(format!("TLS setup failed: {err}")))?;
        let (client, connection) =
            config.connect(MakeTlsConnector::new(connector)).await.map_err(InfraError::from)?;
        tokio::spawn(drive(connection));
        Ok(client)
    } else {
        let (client, connection) = config.connect(NoTls).await.map_err(InfraError::from)?;
        tokio::spawn(drive(connection));
        Ok(client)
    }
}

async fn drive<S, T>(connection: Connection<S, T>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    match connection.await {
        Ok(()) => debug!("database connection closed"),
        Err(err) => warn!(error = %err, "database connection ended with error"),
    }
}
