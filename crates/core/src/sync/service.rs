//! Sync orchestrator: one fan-out pass over every customer site, the
//! commit gate and the audit write.

use std::sync::Arc;

use possync_domain::{
    CommitOutcome, DirectoryEntry, ItemRecord, PaymentRecord, PosSale, Result, RunResult,
    RunSummary, SiteConnection, SiteRejection, TenantConfig,
};
use serde_json::{json, Value};
use tracing::{error, info_span, Instrument};

use super::assembler::{assemble_payload, project_payment, render_payload};
use super::commit::commit_uploads;
use super::dispatch::{call_tenant_api, is_global_success, request_token};
use super::ports::{PrimaryConnector, SiteConnector, SiteStore, TenantDispatcher, TokenBroker};
use super::reader::{
    read_aggregated_payments, read_items, read_site_connections, read_tenant_configs,
};
use super::run_log::{summarize, RunLog};

/// Everything one invocation produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: RunResult,
    /// `None` when the pass was not successful and nothing was committed.
    pub commit: Option<CommitOutcome>,
    pub summary: RunSummary,
}

/// Responses and errors collected across sites and tenants.
#[derive(Default)]
struct PassState {
    responses: Vec<Value>,
    errors: Vec<String>,
}

impl PassState {
    fn fail(&mut self, message: String) {
        self.errors.push(message);
    }

    fn fail_dispatch(&mut self, message: String) {
        self.responses.push(json!({ "error": message }));
        self.errors.push(message);
    }
}

/// A receipt header paired with the items found for it.
struct Receipt {
    payment: PaymentRecord,
    items: Vec<ItemRecord>,
}

/// Sales sync service
pub struct SyncService {
    primary: Arc<dyn PrimaryConnector>,
    sites: Arc<dyn SiteConnector>,
    broker: Arc<dyn TokenBroker>,
    dispatcher: Arc<dyn TenantDispatcher>,
}

impl SyncService {
    /// Create a new sync service over the given ports.
    pub fn new(
        primary: Arc<dyn PrimaryConnector>,
        sites: Arc<dyn SiteConnector>,
        broker: Arc<dyn TokenBroker>,
        dispatcher: Arc<dyn TenantDispatcher>,
    ) -> Self {
        Self { primary, sites, broker, dispatcher }
    }

    /// Run one full invocation: fan-out pass, commit if the first response
    /// reports success, summarize, and write the summary to the audit table.
    ///
    /// Never fails. Problems end up in the run log, the error list and the
    /// summary; a failed audit write is only traced.
    pub async fn run(&self) -> RunReport {
        let mut log = RunLog::new();
        let span = info_span!("sync_run", run_id = %log.run_id());

        async move {
            let (api_responses, errors) = self.sync_pass(&mut log).await;

            let commit = if is_global_success(&api_responses) {
                log.success("Database sync completed successfully", json!({}));
                let outcome = commit_uploads(self.primary.as_ref(), &mut log).await;
                let context = serde_json::to_value(&outcome).unwrap_or_default();
                if outcome.is_success() {
                    log.success("Tables updated successfully", context);
                } else {
                    log.error("Error updating tables", context);
                }
                Some(outcome)
            } else {
                log.warn(
                    "Database sync had some issues",
                    json!({ "responses": api_responses, "errors": errors }),
                );
                None
            };

            let summary = summarize(log.entries());
            self.persist_summary(&summary).await;

            RunReport {
                result: RunResult { api_responses, errors, log_entries: log.into_entries() },
                commit,
                summary,
            }
        }
        .instrument(span)
        .await
    }

    /// One pass over the directory. Returns the collected API responses and
    /// error messages; never commits.
    pub async fn sync_pass(&self, log: &mut RunLog) -> (Vec<Value>, Vec<String>) {
        log.info("Starting syncDB", json!({}));

        let directory = match self.read_directory(log).await {
            Ok(directory) => directory,
            Err(err) => {
                log.error("Unexpected error in syncDB", json!({ "error": err.to_string() }));
                return (Vec::new(), vec![err.to_string()]);
            }
        };

        if directory.is_empty() {
            let message = "No customer data found.";
            log.warn(message, json!({}));
            return (Vec::new(), vec![message.to_string()]);
        }

        let mut state = PassState::default();
        for entry in &directory {
            let site = match entry.validate() {
                Ok(site) => site,
                Err(rejection) => {
                    let context = match rejection {
                        SiteRejection::MissingAddress => json!({ "customer": entry }),
                        SiteRejection::InvalidPort { .. } => json!({}),
                    };
                    let message = rejection.to_string();
                    log.error(&message, context);
                    state.fail(message);
                    continue;
                }
            };

            if let Err(err) = self.sync_site(&site, log, &mut state).await {
                let message = format!("Database Connection Error for IP {}: {err}", site.address);
                log.error(&message, json!({}));
                state.fail(message);
            }
        }

        log.info("syncDB finished", json!({}));
        (state.responses, state.errors)
    }

    /// Directory rows read over a primary connection that is closed on
    /// return.
    async fn read_directory(&self, log: &mut RunLog) -> Result<Vec<DirectoryEntry>> {
        let server = self.primary.server();
        log.info("Connecting to primary DB", json!({ "server": server }));
        let store = self.primary.connect().await?;
        log.success("Connected to primary DB", json!({ "server": server }));

        Ok(read_site_connections(store.as_ref(), log).await)
    }

    /// Process one site: read tenants and payments, then serve each tenant.
    /// Only a failure to connect is returned; everything else is recorded.
    async fn sync_site(
        &self,
        site: &SiteConnection,
        log: &mut RunLog,
        state: &mut PassState,
    ) -> Result<()> {
        let location = json!({ "server": site.address, "port": site.port });
        log.info("Connecting to sync DB", location.clone());
        let store = self.sites.connect(site).await?;
        log.success("Connected to sync DB", location);

        let tenants = read_tenant_configs(store.as_ref(), log).await;
        if tenants.is_empty() {
            let message = format!("No users found for IP: {}", site.address);
            log.warn(&message, json!({}));
            state.fail(message);
            return Ok(());
        }

        let payments = match read_aggregated_payments(store.as_ref(), log).await {
            Ok(payments) => payments,
            Err(message) => {
                log.error(&message, json!({}));
                state.fail(message);
                return Ok(());
            }
        };

        let receipts = collect_receipts(store.as_ref(), payments, log, state).await;

        for tenant in &tenants {
            self.sync_tenant(tenant, &receipts, log, state).await;
        }

        drop(store);
        log.info("Closed connection for this customer", json!({ "server": site.address }));
        Ok(())
    }

    /// Build, authorize and send one tenant's payload.
    async fn sync_tenant(
        &self,
        tenant: &TenantConfig,
        receipts: &[Receipt],
        log: &mut RunLog,
        state: &mut PassState,
    ) {
        let sales: Vec<PosSale> = receipts
            .iter()
            .map(|receipt| project_payment(&receipt.payment, tenant, receipt.items.clone()))
            .collect();
        let payload = assemble_payload(tenant, sales);

        let Some(token) = request_token(self.broker.as_ref(), tenant, log).await else {
            let message =
                format!("Skipping API call for user {} due to token error.", tenant.app_code);
            log.error(&message, json!({}));
            state.fail(message);
            return;
        };

        let body = match render_payload(&payload) {
            Ok(body) => body,
            Err(err) => {
                let message = format!("API Call Failed for user {}: {err}", tenant.app_code);
                log.error(&message, json!({}));
                state.fail_dispatch(message);
                return;
            }
        };

        match call_tenant_api(self.dispatcher.as_ref(), tenant, &body, &token, log).await {
            Ok(response) => state.responses.push(response),
            Err(message) => state.fail_dispatch(message),
        }
    }

    async fn persist_summary(&self, summary: &RunSummary) {
        let result = async {
            let store = self.primary.connect().await?;
            store.record_audit(summary).await
        }
        .await;

        if let Err(err) = result {
            error!(
                error = %err,
                status = %summary.status,
                "Failed to write run summary to audit log"
            );
        }
    }
}

/// Look up items for every payment once. A failed lookup leaves that
/// receipt without items and is recorded as an error.
async fn collect_receipts(
    store: &dyn SiteStore,
    payments: Vec<PaymentRecord>,
    log: &mut RunLog,
    state: &mut PassState,
) -> Vec<Receipt> {
    let mut receipts = Vec::with_capacity(payments.len());

    for payment in payments {
        let items =
            match read_items(store, payment.receipt_date, &payment.receipt_no, log).await {
                Ok(items) => items,
                Err(message) => {
                    log.error(
                        &message,
                        json!({
                            "ReceiptDate": payment.receipt_date.to_string(),
                            "ReceiptNo": payment.receipt_no,
                        }),
                    );
                    state.fail(message);
                    Vec::new()
                }
            };
        receipts.push(Receipt { payment, items });
    }

    receipts
}
