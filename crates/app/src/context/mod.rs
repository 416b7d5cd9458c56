//! Application context - dependency injection container

use std::sync::Arc;

use possync_core::{
    PrimaryConnector, RunReport, SiteConnector, SyncService, TenantDispatcher, TokenBroker,
};
use possync_domain::{Config, Result};
use possync_infra::{
    HttpClient, HttpTenantDispatcher, OAuthTokenBroker, PgPrimaryConnector, PgSiteConnector,
};
use tracing::info;

/// Application context - holds the configuration and the wired sync service
pub struct AppContext {
    pub config: Config,
    pub sync_service: Arc<SyncService>,
}

impl AppContext {
    /// Load configuration from the environment (or a probed config file)
    /// and wire the service.
    pub fn new() -> Result<Self> {
        let config = possync_infra::config::load()?;
        Self::new_with_config(config)
    }

    /// Wire the service from an explicit configuration.
    ///
    /// No connection is opened here; connectors connect on demand during a
    /// run.
    pub fn new_with_config(config: Config) -> Result<Self> {
        let http = HttpClient::from_config(&config.http)?;

        let primary: Arc<dyn PrimaryConnector> =
            Arc::new(PgPrimaryConnector::new(config.database.clone()));
        let sites: Arc<dyn SiteConnector> =
            Arc::new(PgSiteConnector::new(config.database.clone()));
        let broker: Arc<dyn TokenBroker> = Arc::new(OAuthTokenBroker::new(http.clone()));
        let dispatcher: Arc<dyn TenantDispatcher> = Arc::new(HttpTenantDispatcher::new(http));

        info!(
            server = %config.database.server,
            port = config.database.port,
            primary_database = %config.database.primary_database,
            site_database = %config.database.site_database,
            http_timeout_secs = config.http.timeout_secs,
            "application context initialized"
        );

        Ok(Self {
            config,
            sync_service: Arc::new(SyncService::new(primary, sites, broker, dispatcher)),
        })
    }

    /// Run one sync invocation.
    pub async fn run_once(&self) -> RunReport {
        self.sync_service.run().await
    }
}
