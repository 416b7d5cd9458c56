//! Tenant API dispatcher

use async_trait::async_trait;
use possync_core::TenantDispatcher;
use possync_domain::{RemoteError, TenantConfig};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::errors::ApiError;
use crate::http::client::read_body;
use crate::http::HttpClient;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Posts a rendered payload to the tenant's API endpoint, exactly once.
#[derive(Clone)]
pub struct HttpTenantDispatcher {
    http: HttpClient,
}

impl HttpTenantDispatcher {
    /// Create a dispatcher sending through `http`.
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    async fn post(
        &self,
        tenant: &TenantConfig,
        body: &str,
        token: &str,
    ) -> Result<Value, ApiError> {
        let request = self
            .http
            .request(Method::POST, &tenant.api_endpoint)
            .bearer_auth(token)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .body(body.to_owned());

        let response = self.http.send(request).await?;
        let status = response.status();
        let body = read_body(response).await?;

        if !status.is_success() {
            return Err(ApiError::from_status(status, body));
        }

        info!(%status, "tenant API accepted payload");
        Ok(body.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl TenantDispatcher for HttpTenantDispatcher {
    #[instrument(
        skip(self, tenant, body, token),
        fields(app_code = %tenant.app_code, bytes = body.len())
    )]
    async fn dispatch(
        &self,
        tenant: &TenantConfig,
        body: &str,
        token: &str,
    ) -> Result<Value, RemoteError> {
        self.post(tenant, body, token).await.map_err(|err| {
            warn!(category = ?err.category(), error = %err, "tenant API call failed");
            RemoteError::from(err)
        })
    }
}
