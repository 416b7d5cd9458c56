//! Token exchange and tenant API calls, as seen from the run log.

use possync_domain::constants::{RESPONSE_STATUS_FIELD, RESPONSE_STATUS_SUCCESS};
use possync_domain::TenantConfig;
use serde_json::{json, Value};

use super::ports::{TenantDispatcher, TokenBroker};
use super::run_log::RunLog;

/// Fetch a bearer token for `tenant`. Every failure, including an empty
/// token, is logged with the tenant code and yields `None`.
pub async fn request_token(
    broker: &dyn TokenBroker,
    tenant: &TenantConfig,
    log: &mut RunLog,
) -> Option<String> {
    match broker.access_token(tenant).await {
        Ok(token) if token.trim().is_empty() => {
            log.error(
                "Error fetching token",
                json!({ "AppCode": tenant.app_code, "error": "empty access_token" }),
            );
            None
        }
        Ok(token) => {
            log.success("Access token fetched", json!({ "AppCode": tenant.app_code }));
            Some(token)
        }
        Err(err) => {
            log.error(
                "Error fetching token",
                json!({ "AppCode": tenant.app_code, "error": err.detail() }),
            );
            None
        }
    }
}

/// Post `body` to the tenant API once.
///
/// # Errors
///
/// Returns `API Call Failed for user <AppCode>: <cause>`, where the cause is
/// the upstream body when the API answered.
pub async fn call_tenant_api(
    dispatcher: &dyn TenantDispatcher,
    tenant: &TenantConfig,
    body: &str,
    token: &str,
    log: &mut RunLog,
) -> Result<Value, String> {
    log.info(
        "Calling external API",
        json!({ "AppCode": tenant.app_code, "endpoint": tenant.api_endpoint }),
    );

    match dispatcher.dispatch(tenant, body, token).await {
        Ok(response) => {
            log.success("API Call Successful", json!({ "AppCode": tenant.app_code }));
            Ok(response)
        }
        Err(err) => {
            let message =
                format!("API Call Failed for user {}: {}", tenant.app_code, err.detail_text());
            log.error(&message, json!({}));
            Err(message)
        }
    }
}

/// Whether the pass counts as successful: the first response carries
/// `returnStatus == "Success"`.
pub fn is_global_success(responses: &[Value]) -> bool {
    responses
        .first()
        .and_then(|response| response.get(RESPONSE_STATUS_FIELD))
        .and_then(Value::as_str)
        == Some(RESPONSE_STATUS_SUCCESS)
}
