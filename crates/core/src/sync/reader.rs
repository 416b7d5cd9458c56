//! Logged reads against the primary and site stores.
//!
//! Every read failure is caught here, recorded in the run log and turned
//! into an empty or error sentinel. Callers decide whether to continue.

use chrono::NaiveDate;
use possync_domain::constants::DIRECTORY_TABLE;
use possync_domain::{DirectoryEntry, ItemRecord, PaymentRecord, TenantConfig};
use serde_json::json;

use super::aggregate::aggregate_payment_lines;
use super::ports::{PrimaryStore, SiteStore};
use super::run_log::RunLog;

/// Directory rows, or an empty list when the table is empty or unreadable.
pub async fn read_site_connections(
    store: &dyn PrimaryStore,
    log: &mut RunLog,
) -> Vec<DirectoryEntry> {
    match store.list_site_connections().await {
        Ok(entries) if entries.is_empty() => {
            log.warn(format!("No customer data found in {DIRECTORY_TABLE}"), json!({}));
            Vec::new()
        }
        Ok(entries) => {
            log.success("Fetched sync DB connection data", json!({ "count": entries.len() }));
            entries
        }
        Err(err) => {
            log.error(
                "Error fetching sync DB connection data",
                json!({ "error": err.to_string() }),
            );
            Vec::new()
        }
    }
}

/// Tenant configurations with every string field trimmed.
pub async fn read_tenant_configs(store: &dyn SiteStore, log: &mut RunLog) -> Vec<TenantConfig> {
    match store.list_tenant_configs().await {
        Ok(tenants) if tenants.is_empty() => {
            log.warn("Cannot fetch user details (0 rows)", json!({}));
            Vec::new()
        }
        Ok(tenants) => {
            let trimmed: Vec<TenantConfig> = tenants.iter().map(TenantConfig::trimmed).collect();
            log.success("Fetched user details", json!({ "count": trimmed.len() }));
            trimmed
        }
        Err(err) => {
            log.error(
                "Error fetching user connection details",
                json!({ "error": err.to_string() }),
            );
            Vec::new()
        }
    }
}

/// Unuploaded payment lines folded into one header per receipt.
///
/// # Errors
///
/// Returns the message to report when there is nothing to send or the read
/// failed.
pub async fn read_aggregated_payments(
    store: &dyn SiteStore,
    log: &mut RunLog,
) -> Result<Vec<PaymentRecord>, String> {
    let lines = match store.list_payment_lines().await {
        Ok(lines) => lines,
        Err(err) => {
            let message = format!("Error fetching user payment details: {err}");
            log.error(&message, json!({}));
            return Err(message);
        }
    };

    let payments = aggregate_payment_lines(lines);
    if payments.is_empty() {
        let message = "Cannot fetch user payment details (0 rows)".to_string();
        log.warn(&message, json!({}));
        return Err(message);
    }

    log.success("Fetched user payment details", json!({ "count": payments.len() }));
    Ok(payments)
}

/// Unuploaded items of one receipt. An empty result counts as a failed
/// lookup.
///
/// # Errors
///
/// Returns the message to report when no items were found or the read
/// failed.
pub async fn read_items(
    store: &dyn SiteStore,
    receipt_date: NaiveDate,
    receipt_no: &str,
    log: &mut RunLog,
) -> Result<Vec<ItemRecord>, String> {
    let key = json!({ "ReceiptDate": receipt_date.to_string(), "ReceiptNo": receipt_no });

    match store.list_items(receipt_date, receipt_no).await {
        Ok(items) if items.is_empty() => {
            let message = "No user items details found for given receipt".to_string();
            log.warn(&message, key);
            Err(message)
        }
        Ok(items) => {
            log.success(
                "Fetched user items details",
                json!({
                    "ReceiptDate": receipt_date.to_string(),
                    "ReceiptNo": receipt_no,
                    "count": items.len(),
                }),
            );
            Ok(items)
        }
        Err(err) => {
            let message = format!("Error fetching user items details: {err}");
            log.error(&message, key);
            Err(message)
        }
    }
}
