//! OAuth client-credentials token broker

use async_trait::async_trait;
use possync_core::TokenBroker;
use possync_domain::constants::CLIENT_CREDENTIALS_GRANT;
use possync_domain::{RemoteError, TenantConfig};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::errors::ApiError;
use crate::http::client::read_body;
use crate::http::HttpClient;

/// Exchanges a tenant's client id and secret for a bearer token.
///
/// One form-encoded POST per call; tokens are not cached.
#[derive(Clone)]
pub struct OAuthTokenBroker {
    http: HttpClient,
}

impl OAuthTokenBroker {
    /// Create a broker sending through `http`.
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    async fn fetch_token(&self, tenant: &TenantConfig) -> Result<String, ApiError> {
        let form = [
            ("client_id", tenant.client_id.as_str()),
            ("client_secret", tenant.client_secret.as_str()),
            ("grant_type", CLIENT_CREDENTIALS_GRANT),
        ];
        let request = self.http.request(Method::POST, &tenant.oauth_token_url).form(&form);

        let response = self.http.send(request).await?;
        let status = response.status();
        let body = read_body(response).await?;

        if !status.is_success() {
            return Err(ApiError::from_status(status, body));
        }

        body.as_ref()
            .and_then(|body| body.get("access_token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| ApiError::InvalidResponse("access_token missing from response".into()))
    }
}

#[async_trait]
impl TokenBroker for OAuthTokenBroker {
    #[instrument(skip(self, tenant), fields(app_code = %tenant.app_code))]
    async fn access_token(&self, tenant: &TenantConfig) -> Result<String, RemoteError> {
        match self.fetch_token(tenant).await {
            Ok(token) => {
                debug!("token issued");
                Ok(token)
            }
            Err(err) => {
                warn!(category = ?err.category(), error = %err, "token request failed");
                Err(err.into())
            }
        }
    }
}
