//! Builders for tenant, payment and item rows.

use chrono::{NaiveDate, NaiveTime};
use possync_domain::{DirectoryEntry, ItemRecord, PaymentLine, TenantConfig};

pub fn tenant(app_code: &str) -> TenantConfig {
    TenantConfig {
        app_code: app_code.to_string(),
        property_code: format!("PROP-{app_code}"),
        pos_interface_code: format!("POS-{app_code}"),
        batch_code: "B01".to_string(),
        sales_tax_rate: 6.0,
        oauth_token_url: format!("https://auth.example.com/{app_code}/token"),
        client_id: format!("client-{app_code}"),
        client_secret: format!("secret-{app_code}"),
        api_endpoint: format!("https://api.example.com/{app_code}/sales"),
    }
}

pub fn receipt_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}

pub fn payment_line(receipt_no: &str, method: &str, amount: f64) -> PaymentLine {
    PaymentLine {
        idx: 1,
        receipt_no: receipt_no.to_string(),
        receipt_date: receipt_date(),
        receipt_time: NaiveTime::from_hms_opt(14, 5, 9).unwrap(),
        no_of_items: 1,
        sales_currency: "MYR".to_string(),
        total_sales_amt_b4_tax: amount,
        total_sales_amt_after_tax: amount,
        sales_tax_rate: 6.0,
        service_charge_amt: 0.0,
        payment_amt: amount,
        payment_currency: "MYR".to_string(),
        payment_method: method.to_string(),
        sales_type: "DINE-IN".to_string(),
        upload: Some("F".to_string()),
        insert_time: None,
    }
}

pub fn item(desc: &str, amount: f64) -> ItemRecord {
    ItemRecord { item_desc: desc.to_string(), item_amt: amount, item_discount_amt: 0.0 }
}

pub fn entry(ip: &str, port: Option<&str>) -> DirectoryEntry {
    DirectoryEntry::new(Some(ip), port)
}
