//! Shared helpers for the PostgreSQL integration tests.
//!
//! Tests run only when `POSSYNC_TEST_DATABASE_URL` points at a scratch
//! database; every helper call resets the sync tables.

#![allow(dead_code)]

use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use possync_domain::DatabaseConfig;
use possync_infra::database::SCHEMA_SQL;
use tokio::sync::{Mutex, MutexGuard};
use tokio_postgres::config::Host;
use tokio_postgres::{Client, Config as PgConfig, NoTls};

pub const DATABASE_URL_VAR: &str = "POSSYNC_TEST_DATABASE_URL";

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Exclusive handle on the scratch database for one test.
pub struct TestDatabase {
    pub settings: DatabaseConfig,
    pub client: Client,
    _guard: MutexGuard<'static, ()>,
}

impl TestDatabase {
    pub fn host(&self) -> &str {
        &self.settings.server
    }

    pub async fn insert_directory(&self, ip: Option<&str>, port: Option<&str>) {
        self.client
            .execute("INSERT INTO tb_SYNCDB_USERS (IP, PORT) VALUES ($1, $2)", &[&ip, &port])
            .await
            .expect("insert directory row");
    }

    pub async fn insert_tenant(&self, app: &str, token_url: &str, endpoint: &str) {
        self.client
            .execute(
                "INSERT INTO tb_OGFMAIN (AppCode, PropertyCode, POSInterfaceCode, BatchCode, \
                 SalesTaxRate, OAUTH_TOKEN_URL, ClientID, ClientSecret, API_ENDPOINT) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &app,
                    &format!("PROP-{app} "),
                    &format!("POS-{app}"),
                    &"B01",
                    &6.0_f64,
                    &token_url,
                    &format!("client-{app}"),
                    &format!("secret-{app}"),
                    &endpoint,
                ],
            )
            .await
            .expect("insert tenant");
    }

    pub async fn insert_payment(
        &self,
        receipt: &str,
        method: &str,
        amount: f64,
        upload: Option<&str>,
    ) {
        self.client
            .execute(
                "INSERT INTO tb_OGFPAYMENT (ReceiptNo, ReceiptDate, ReceiptTime, NoOfItems, \
                 SalesCurrency, TotalSalesAmtB4Tax, TotalSalesAmtAfterTax, SalesTaxRate, \
                 ServiceChargeAmt, PaymentAmt, PaymentCurrency, PaymentMethod, SalesType, \
                 UPLOAD) \
                 VALUES ($1, $2, '14:05:09', 1, 'MYR', $3, $3, 6, 0, $3, 'MYR', $4, \
                 'DINE-IN', $5)",
                &[&receipt, &receipt_date(), &amount, &method, &upload],
            )
            .await
            .expect("insert payment");
    }

    pub async fn insert_item(
        &self,
        receipt: &str,
        date: NaiveDate,
        desc: &str,
        upload: Option<&str>,
    ) {
        self.client
            .execute(
                "INSERT INTO tb_OGFITEMSALE (ReceiptNo, ReceiptDate, Item_Desc, ItemAmt, \
                 ItemDiscountAmt, UPLOAD) VALUES ($1, $2, $3, 9.5, 0.5, $4)",
                &[&receipt, &date, &desc, &upload],
            )
            .await
            .expect("insert item");
    }

    /// Rows of `table` whose upload marker is not `'T'`.
    pub async fn pending_rows(&self, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE UPLOAD IS NULL OR UPLOAD <> 'T'");
        self.client.query_one(sql.as_str(), &[]).await.expect("count rows").get(0)
    }

    /// Every audit row as `(status, message, context)`, oldest first.
    pub async fn audit_rows(&self) -> Vec<(String, String, String)> {
        self.client
            .query("SELECT STATUS, MESSAGE, CONTEXT FROM tb_SYNC_LOG ORDER BY IDX", &[])
            .await
            .expect("read audit rows")
            .iter()
            .map(|row| (row.get(0), row.get(1), row.get(2)))
            .collect()
    }
}

pub fn receipt_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date")
}

/// Connect to the scratch database, apply the schema and empty every table.
/// Returns `None` when no database is configured.
pub async fn test_database() -> Option<TestDatabase> {
    let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
        eprintln!("skipping: {DATABASE_URL_VAR} is not set");
        return None;
    };

    let guard = DB_LOCK.lock().await;
    let config = PgConfig::from_str(&url).expect("valid database url");
    let settings = settings_from(&config);

    let (client, connection) = config.connect(NoTls).await.expect("connect to test database");
    tokio::spawn(async move {
        let _ = connection.await;
    });

    client.batch_execute(SCHEMA_SQL).await.expect("apply schema");
    client
        .batch_execute(
            "TRUNCATE tb_SYNCDB_USERS, tb_SYNC_LOG, tb_OGFMAIN, tb_OGFPAYMENT, tb_OGFITEMSALE \
             RESTART IDENTITY",
        )
        .await
        .expect("reset tables");

    Some(TestDatabase { settings, client, _guard: guard })
}

/// The primary and the site database are the same scratch database.
fn settings_from(config: &PgConfig) -> DatabaseConfig {
    let server = config
        .get_hosts()
        .iter()
        .find_map(|host| match host {
            Host::Tcp(name) => Some(name.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "localhost".to_string());
    let database = config.get_dbname().unwrap_or("postgres").to_string();

    DatabaseConfig {
        user: config.get_user().unwrap_or("postgres").to_string(),
        password: config
            .get_password()
            .map(|password| String::from_utf8_lossy(password).into_owned())
            .unwrap_or_default(),
        server,
        port: config.get_ports().first().copied().unwrap_or(5432),
        primary_database: database.clone(),
        site_database: database,
        encrypt: false,
        trust_server_certificate: true,
        connect_timeout_secs: 5,
    }
}
