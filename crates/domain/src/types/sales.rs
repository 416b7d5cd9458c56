//! Sales data read from site databases and the payload shapes sent to
//! tenant APIs.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Raw row of the directory table, as stored.
///
/// Both columns are free text in the directory and may be missing; use
/// [`DirectoryEntry::validate`] to obtain a [`SiteConnection`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(rename = "IP")]
    pub ip: Option<String>,
    #[serde(rename = "PORT")]
    pub port: Option<String>,
}

/// Why a directory row could not be turned into a site connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteRejection {
    MissingAddress,
    InvalidPort { address: String },
}

impl fmt::Display for SiteRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAddress => write!(f, "IP is null for a customer entry"),
            Self::InvalidPort { address } => {
                write!(f, "Port is null or invalid for IP: {address}")
            }
        }
    }
}

impl DirectoryEntry {
    /// Build a row from raw column values.
    pub fn new(ip: Option<&str>, port: Option<&str>) -> Self {
        Self { ip: ip.map(str::to_owned), port: port.map(str::to_owned) }
    }

    /// Trim and validate the row: the address must be non-empty and the port
    /// a positive integer.
    pub fn validate(&self) -> Result<SiteConnection, SiteRejection> {
        let address = self
            .ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .ok_or(SiteRejection::MissingAddress)?;

        let port = self
            .port
            .as_deref()
            .map(str::trim)
            .and_then(|port| port.parse::<u16>().ok())
            .filter(|port| *port > 0)
            .ok_or_else(|| SiteRejection::InvalidPort { address: address.to_owned() })?;

        Ok(SiteConnection { address: address.to_owned(), port })
    }
}

/// Network location of one customer's database server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteConnection {
    pub address: String,
    pub port: u16,
}

/// Per-tenant application configuration stored in a site database.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    pub app_code: String,
    pub property_code: String,
    pub pos_interface_code: String,
    pub batch_code: String,
    pub sales_tax_rate: f64,
    pub oauth_token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub api_endpoint: String,
}

impl TenantConfig {
    /// Copy of this config with every string field whitespace-trimmed.
    pub fn trimmed(&self) -> Self {
        Self {
            app_code: self.app_code.trim().to_owned(),
            property_code: self.property_code.trim().to_owned(),
            pos_interface_code: self.pos_interface_code.trim().to_owned(),
            batch_code: self.batch_code.trim().to_owned(),
            sales_tax_rate: self.sales_tax_rate,
            oauth_token_url: self.oauth_token_url.trim().to_owned(),
            client_id: self.client_id.trim().to_owned(),
            client_secret: self.client_secret.trim().to_owned(),
            api_endpoint: self.api_endpoint.trim().to_owned(),
        }
    }
}

impl fmt::Debug for TenantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantConfig")
            .field("app_code", &self.app_code)
            .field("property_code", &self.property_code)
            .field("pos_interface_code", &self.pos_interface_code)
            .field("batch_code", &self.batch_code)
            .field("sales_tax_rate", &self.sales_tax_rate)
            .field("oauth_token_url", &self.oauth_token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_endpoint", &self.api_endpoint)
            .finish()
    }
}

/// One unuploaded row of the payment table.
///
/// A receipt may be split across several rows (one per tender); rows are
/// folded into a [`PaymentRecord`] before assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLine {
    pub idx: i64,
    pub receipt_no: String,
    pub receipt_date: NaiveDate,
    pub receipt_time: NaiveTime,
    pub no_of_items: i64,
    pub sales_currency: String,
    pub total_sales_amt_b4_tax: f64,
    pub total_sales_amt_after_tax: f64,
    pub sales_tax_rate: f64,
    pub service_charge_amt: f64,
    pub payment_amt: f64,
    pub payment_currency: String,
    pub payment_method: String,
    pub sales_type: String,
    pub upload: Option<String>,
    pub insert_time: Option<NaiveDateTime>,
}

/// Payment header aggregated per receipt number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub receipt_no: String,
    pub receipt_date: NaiveDate,
    pub receipt_time: NaiveTime,
    pub no_of_items: i64,
    pub sales_currency: String,
    pub total_sales_amt_b4_tax: f64,
    pub total_sales_amt_after_tax: f64,
    pub sales_tax_rate: f64,
    pub service_charge_amt: f64,
    pub payment_amt: f64,
    pub payment_currency: String,
    /// Comma-joined, sorted, distinct tender names
    pub payment_method: String,
    pub sales_type: String,
}

/// Line item of a receipt, in the shape the tenant API expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(rename = "Item_Desc")]
    pub item_desc: String,
    #[serde(rename = "ItemAmt")]
    pub item_amt: f64,
    #[serde(rename = "ItemDiscountAmt")]
    pub item_discount_amt: f64,
}

/// A payment with the tenant codes merged in and its items attached.
///
/// Field order is the key order of the serialized payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosSale {
    #[serde(rename = "PropertyCode")]
    pub property_code: String,
    #[serde(rename = "POSInterfaceCode")]
    pub pos_interface_code: String,
    #[serde(rename = "ReceiptNo")]
    pub receipt_no: String,
    /// `DD/MM/YYYY`
    #[serde(rename = "ReceiptDate")]
    pub receipt_date: String,
    /// `HH:MM:SS`, 24-hour
    #[serde(rename = "ReceiptTime")]
    pub receipt_time: String,
    #[serde(rename = "NoOfItems")]
    pub no_of_items: i64,
    #[serde(rename = "SalesCurrency")]
    pub sales_currency: String,
    #[serde(rename = "TotalSalesAmtB4Tax")]
    pub total_sales_amt_b4_tax: f64,
    #[serde(rename = "TotalSalesAmtAfterTax")]
    pub total_sales_amt_after_tax: f64,
    #[serde(rename = "SalesTaxRate")]
    pub sales_tax_rate: f64,
    #[serde(rename = "ServiceChargeAmt")]
    pub service_charge_amt: f64,
    #[serde(rename = "PaymentAmt")]
    pub payment_amt: f64,
    #[serde(rename = "PaymentCurrency")]
    pub payment_currency: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
    #[serde(rename = "SalesType")]
    pub sales_type: String,
    #[serde(rename = "Items")]
    pub items: Vec<ItemRecord>,
}

/// Request body posted to one tenant's API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantPayload {
    #[serde(rename = "AppCode")]
    pub app_code: String,
    #[serde(rename = "PropertyCode")]
    pub property_code: String,
    #[serde(rename = "ClientID")]
    pub client_id: String,
    #[serde(rename = "ClientSecret")]
    pub client_secret: String,
    #[serde(rename = "POSInterfaceCode")]
    pub pos_interface_code: String,
    #[serde(rename = "BatchCode")]
    pub batch_code: String,
    #[serde(rename = "PosSales")]
    pub pos_sales: Vec<PosSale>,
}
