//! In-memory implementations of the sync ports.
//!
//! Each mock records the calls it receives behind an `Arc<Mutex<_>>` so a
//! test can hand a clone to `SyncService` and inspect it afterwards. Open
//! connections are counted through a shared [`ConnectionGauge`].

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use possync_core::{
    PrimaryConnector, PrimaryStore, SiteConnector, SiteStore, TenantDispatcher, TokenBroker,
};
use possync_domain::{
    CommitCounts, DirectoryEntry, ItemRecord, PaymentLine, PosSyncError, RemoteError,
    Result as DomainResult, RunSummary, SiteConnection, TenantConfig,
};
use serde_json::{json, Value};

/// Tracks how many store handles are alive at once.
#[derive(Default)]
pub struct ConnectionGauge {
    open: AtomicUsize,
    peak: AtomicUsize,
}

impl ConnectionGauge {
    fn acquire(self: &Arc<Self>) -> ConnectionGuard {
        let open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(open, Ordering::SeqCst);
        ConnectionGuard(Arc::clone(self))
    }

    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct ConnectionGuard(Arc<ConnectionGauge>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.open.fetch_sub(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Primary database
// ---------------------------------------------------------------------------

/// Directory rows plus the unmarked row counts the commit will flip.
#[derive(Default)]
pub struct PrimaryState {
    pub directory: Vec<DirectoryEntry>,
    pub fail_directory: bool,
    pub fail_connect: bool,
    pub fail_commit: bool,
    pub pending_payment_rows: u64,
    pub pending_item_rows: u64,
    pub connects: usize,
    pub commits: usize,
    pub audits: Vec<RunSummary>,
}

#[derive(Clone)]
pub struct MockPrimary {
    pub state: Arc<Mutex<PrimaryState>>,
    gauge: Arc<ConnectionGauge>,
}

impl MockPrimary {
    pub fn new(directory: Vec<DirectoryEntry>, gauge: Arc<ConnectionGauge>) -> Self {
        let state = PrimaryState { directory, ..PrimaryState::default() };
        Self { state: Arc::new(Mutex::new(state)), gauge }
    }

    pub fn with_pending_rows(self, payment_rows: u64, item_rows: u64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.pending_payment_rows = payment_rows;
            state.pending_item_rows = item_rows;
        }
        self
    }

    pub fn failing_directory(self) -> Self {
        self.state.lock().unwrap().fail_directory = true;
        self
    }

    pub fn failing_connect(self) -> Self {
        self.state.lock().unwrap().fail_connect = true;
        self
    }

    pub fn failing_commit(self) -> Self {
        self.state.lock().unwrap().fail_commit = true;
        self
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn audits(&self) -> Vec<RunSummary> {
        self.state.lock().unwrap().audits.clone()
    }
}

#[async_trait]
impl PrimaryConnector for MockPrimary {
    async fn connect(&self) -> DomainResult<Box<dyn PrimaryStore>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_connect {
            return Err(PosSyncError::Database("primary unreachable".into()));
        }
        state.connects += 1;
        Ok(Box::new(MockPrimaryStore {
            state: Arc::clone(&self.state),
            _guard: self.gauge.acquire(),
        }))
    }

    fn server(&self) -> String {
        "primary.test".to_string()
    }
}

struct MockPrimaryStore {
    state: Arc<Mutex<PrimaryState>>,
    _guard: ConnectionGuard,
}

#[async_trait]
impl PrimaryStore for MockPrimaryStore {
    async fn list_site_connections(&self) -> DomainResult<Vec<DirectoryEntry>> {
        let state = self.state.lock().unwrap();
        if state.fail_directory {
            return Err(PosSyncError::Database("directory table missing".into()));
        }
        Ok(state.directory.clone())
    }

    async fn commit_uploads(&mut self) -> DomainResult<CommitCounts> {
        let mut state = self.state.lock().unwrap();
        state.commits += 1;
        if state.fail_commit {
            return Err(PosSyncError::Database("deadlock detected".into()));
        }
        let counts = CommitCounts {
            payment_rows: state.pending_payment_rows,
            item_rows: state.pending_item_rows,
        };
        state.pending_payment_rows = 0;
        state.pending_item_rows = 0;
        Ok(counts)
    }

    async fn record_audit(&self, summary: &RunSummary) -> DomainResult<()> {
        self.state.lock().unwrap().audits.push(summary.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Site databases
// ---------------------------------------------------------------------------

/// Contents of one site database.
#[derive(Clone, Default)]
pub struct SiteData {
    pub tenants: Vec<TenantConfig>,
    pub payment_lines: Vec<PaymentLine>,
    pub fail_tenants: bool,
    pub fail_payments: bool,
    /// Items keyed by receipt number
    pub items: HashMap<String, Vec<ItemRecord>>,
    pub failing_item_receipts: HashSet<String>,
}

impl SiteData {
    pub fn new(tenants: Vec<TenantConfig>, payment_lines: Vec<PaymentLine>) -> Self {
        Self { tenants, payment_lines, ..Self::default() }
    }

    pub fn with_items(mut self, receipt_no: &str, items: Vec<ItemRecord>) -> Self {
        self.items.insert(receipt_no.to_string(), items);
        self
    }
}

#[derive(Default)]
pub struct SitesState {
    pub sites: HashMap<String, SiteData>,
    pub unreachable: HashSet<String>,
    pub connected: Vec<SiteConnection>,
    pub item_lookups: Vec<(NaiveDate, String)>,
}

#[derive(Clone)]
pub struct MockSites {
    pub state: Arc<Mutex<SitesState>>,
    gauge: Arc<ConnectionGauge>,
}

impl MockSites {
    pub fn new(gauge: Arc<ConnectionGauge>) -> Self {
        Self { state: Arc::new(Mutex::new(SitesState::default())), gauge }
    }

    pub fn with_site(self, address: &str, data: SiteData) -> Self {
        self.state.lock().unwrap().sites.insert(address.to_string(), data);
        self
    }

    pub fn with_unreachable(self, address: &str) -> Self {
        self.state.lock().unwrap().unreachable.insert(address.to_string());
        self
    }

    pub fn connected(&self) -> Vec<SiteConnection> {
        self.state.lock().unwrap().connected.clone()
    }

    pub fn item_lookups(&self) -> Vec<(NaiveDate, String)> {
        self.state.lock().unwrap().item_lookups.clone()
    }
}

#[async_trait]
impl SiteConnector for MockSites {
    async fn connect(&self, site: &SiteConnection) -> DomainResult<Box<dyn SiteStore>> {
        let mut state = self.state.lock().unwrap();
        state.connected.push(site.clone());
        if state.unreachable.contains(&site.address) {
            return Err(PosSyncError::Database("connection refused".into()));
        }
        let data = state.sites.get(&site.address).cloned().unwrap_or_default();
        Ok(Box::new(MockSiteStore {
            data,
            state: Arc::clone(&self.state),
            _guard: self.gauge.acquire(),
        }))
    }
}

struct MockSiteStore {
    data: SiteData,
    state: Arc<Mutex<SitesState>>,
    _guard: ConnectionGuard,
}

#[async_trait]
impl SiteStore for MockSiteStore {
    async fn list_tenant_configs(&self) -> DomainResult<Vec<TenantConfig>> {
        if self.data.fail_tenants {
            return Err(PosSyncError::Database("permission denied for tb_OGFMAIN".into()));
        }
        Ok(self.data.tenants.clone())
    }

    async fn list_payment_lines(&self) -> DomainResult<Vec<PaymentLine>> {
        if self.data.fail_payments {
            return Err(PosSyncError::Database("invalid column name".into()));
        }
        Ok(self.data.payment_lines.clone())
    }

    async fn list_items(
        &self,
        receipt_date: NaiveDate,
        receipt_no: &str,
    ) -> DomainResult<Vec<ItemRecord>> {
        self.state.lock().unwrap().item_lookups.push((receipt_date, receipt_no.to_string()));
        if self.data.failing_item_receipts.contains(receipt_no) {
            return Err(PosSyncError::Database("timeout".into()));
        }
        Ok(self.data.items.get(receipt_no).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Remote collaborators
// ---------------------------------------------------------------------------

/// Issues `token-<AppCode>` unless the tenant is configured to fail.
#[derive(Clone, Default)]
pub struct MockBroker {
    failing: Arc<HashSet<String>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockBroker {
    pub fn failing_for(app_codes: &[&str]) -> Self {
        Self {
            failing: Arc::new(app_codes.iter().map(|code| code.to_string()).collect()),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenBroker for MockBroker {
    async fn access_token(&self, tenant: &TenantConfig) -> Result<String, RemoteError> {
        self.calls.lock().unwrap().push(tenant.app_code.clone());
        if self.failing.contains(&tenant.app_code) {
            return Err(RemoteError::with_payload(
                "HTTP 401",
                json!({ "error": "invalid_client" }),
            ));
        }
        Ok(format!("token-{}", tenant.app_code))
    }
}

/// One recorded API call.
#[derive(Debug, Clone)]
pub struct DispatchCall {
    pub app_code: String,
    pub body: String,
    pub token: String,
}

impl DispatchCall {
    pub fn payload(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Answers `{"returnStatus": "Success"}` unless a tenant has a scripted
/// reply.
#[derive(Clone, Default)]
pub struct MockDispatcher {
    replies: Arc<HashMap<String, Result<Value, RemoteError>>>,
    pub calls: Arc<Mutex<Vec<DispatchCall>>>,
}

impl MockDispatcher {
    pub fn with_reply(app_code: &str, reply: Result<Value, RemoteError>) -> Self {
        let mut replies = HashMap::new();
        replies.insert(app_code.to_string(), reply);
        Self { replies: Arc::new(replies), calls: Arc::default() }
    }

    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TenantDispatcher for MockDispatcher {
    async fn dispatch(
        &self,
        tenant: &TenantConfig,
        body: &str,
        token: &str,
    ) -> Result<Value, RemoteError> {
        self.calls.lock().unwrap().push(DispatchCall {
            app_code: tenant.app_code.clone(),
            body: body.to_string(),
            token: token.to_string(),
        });
        self.replies
            .get(&tenant.app_code)
            .cloned()
            .unwrap_or_else(|| Ok(json!({ "returnStatus": "Success" })))
    }
}
