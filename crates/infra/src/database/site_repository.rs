//! Site database: tenant configuration, payment lines and receipt items.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use possync_core::{SiteConnector, SiteStore};
use possync_domain::constants::{TENANT_TABLE, UPLOADED_MARKER};
use possync_domain::{
    DatabaseConfig, ItemRecord, PaymentLine, Result, SiteConnection, TenantConfig,
};
use tokio_postgres::{Client, Row};
use tracing::{debug, instrument};

use super::connection::{open, pg_config};
use super::map_pg_error;

/// Opens connections to site databases, using the shared credentials and the
/// configured site database name.
#[derive(Clone)]
pub struct PgSiteConnector {
    settings: DatabaseConfig,
}

impl PgSiteConnector {
    /// Create a connector using the shared credentials in `settings`.
    pub fn new(settings: DatabaseConfig) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SiteConnector for PgSiteConnector {
    #[instrument(skip(self, site), fields(address = %site.address, port = site.port))]
    async fn connect(&self, site: &SiteConnection) -> Result<Box<dyn SiteStore>> {
        let config =
            pg_config(&self.settings, &site.address, site.port, &self.settings.site_database);
        let client = open(&self.settings, &config).await?;
        debug!("connected to site database");
        Ok(Box::new(PgSiteStore::new(client)))
    }
}

/// Live connection to one site database.
pub struct PgSiteStore {
    client: Client,
}

impl PgSiteStore {
    /// Wrap an open client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SiteStore for PgSiteStore {
    async fn list_tenant_configs(&self) -> Result<Vec<TenantConfig>> {
        let rows = self
            .client
            .query(TENANT_SELECT_SQL, &[])
            .await
            .map_err(|err| map_pg_error("tenants.list", err))?;

        debug!(table = TENANT_TABLE, rows = rows.len(), "tenant rows read");
        rows.iter().map(tenant_from_row).collect()
    }

    async fn list_payment_lines(&self) -> Result<Vec<PaymentLine>> {
        let rows = self
            .client
            .query(PAYMENT_SELECT_SQL, &[&UPLOADED_MARKER])
            .await
            .map_err(|err| map_pg_error("payments.list", err))?;

        rows.iter().map(payment_from_row).collect()
    }

    async fn list_items(
        &self,
        receipt_date: NaiveDate,
        receipt_no: &str,
    ) -> Result<Vec<ItemRecord>> {
        let rows = self
            .client
            .query(ITEM_SELECT_SQL, &[&receipt_date, &receipt_no, &UPLOADED_MARKER])
            .await
            .map_err(|err| map_pg_error("items.list", err))?;

        rows.iter().map(item_from_row).collect()
    }
}

fn text(row: &Row, idx: usize, op: &'static str) -> Result<String> {
    let value: Option<String> = row.try_get(idx).map_err(|err| map_pg_error(op, err))?;
    Ok(value.unwrap_or_default())
}

fn amount(row: &Row, idx: usize, op: &'static str) -> Result<f64> {
    let value: Option<f64> = row.try_get(idx).map_err(|err| map_pg_error(op, err))?;
    Ok(value.unwrap_or_default())
}

fn tenant_from_row(row: &Row) -> Result<TenantConfig> {
    const OP: &str = "tenants.row";
    Ok(TenantConfig {
        app_code: text(row, 0, OP)?,
        property_code: text(row, 1, OP)?,
        pos_interface_code: text(row, 2, OP)?,
        batch_code: text(row, 3, OP)?,
        sales_tax_rate: amount(row, 4, OP)?,
        oauth_token_url: text(row, 5, OP)?,
        client_id: text(row, 6, OP)?,
        client_secret: text(row, 7, OP)?,
        api_endpoint: text(row, 8, OP)?,
    })
}

fn payment_from_row(row: &Row) -> Result<PaymentLine> {
    const OP: &str = "payments.row";
    let no_of_items: Option<i32> = row.try_get(4).map_err(|err| map_pg_error(OP, err))?;
    let receipt_date: NaiveDate = row.try_get(2).map_err(|err| map_pg_error(OP, err))?;
    let receipt_time: NaiveTime = row.try_get(3).map_err(|err| map_pg_error(OP, err))?;
    let insert_time: Option<NaiveDateTime> =
        row.try_get(15).map_err(|err| map_pg_error(OP, err))?;

    Ok(PaymentLine {
        idx: row.try_get(0).map_err(|err| map_pg_error(OP, err))?,
        receipt_no: text(row, 1, OP)?,
        receipt_date,
        receipt_time,
        no_of_items: i64::from(no_of_items.unwrap_or_default()),
        sales_currency: text(row, 5, OP)?,
        total_sales_amt_b4_tax: amount(row, 6, OP)?,
        total_sales_amt_after_tax: amount(row, 7, OP)?,
        sales_tax_rate: amount(row, 8, OP)?,
        service_charge_amt: amount(row, 9, OP)?,
        payment_amt: amount(row, 10, OP)?,
        payment_currency: text(row, 11, OP)?,
        payment_method: text(row, 12, OP)?,
        sales_type: text(row, 13, OP)?,
        upload: row.try_get(14).map_err(|err| map_pg_error(OP, err))?,
        insert_time,
    })
}

fn item_from_row(row: &Row) -> Result<ItemRecord> {
    const OP: &str = "items.row";
    Ok(ItemRecord {
        item_desc: text(row, 0, OP)?,
        item_amt: amount(row, 1, OP)?,
        item_discount_amt: amount(row, 2, OP)?,
    })
}

const TENANT_SELECT_SQL: &str = "SELECT AppCode, PropertyCode, POSInterfaceCode, BatchCode, \
     SalesTaxRate, OAUTH_TOKEN_URL, ClientID, ClientSecret, API_ENDPOINT \
     FROM tb_OGFMAIN";

const PAYMENT_SELECT_SQL: &str = "SELECT IDX, ReceiptNo, ReceiptDate, ReceiptTime, NoOfItems, \
     SalesCurrency, TotalSalesAmtB4Tax, TotalSalesAmtAfterTax, SalesTaxRate, ServiceChargeAmt, \
     PaymentAmt, PaymentCurrency, PaymentMethod, SalesType, UPLOAD, Insert_Time \
     FROM tb_OGFPAYMENT \
     WHERE UPLOAD IS NULL OR UPLOAD <> $1 \
     ORDER BY ReceiptNo, IDX";

const ITEM_SELECT_SQL: &str = "SELECT Item_Desc, ItemAmt, ItemDiscountAmt \
     FROM tb_OGFITEMSALE \
     WHERE ReceiptDate = $1 AND ReceiptNo = $2 AND (UPLOAD IS NULL OR UPLOAD <> $3) \
     ORDER BY IDX";
