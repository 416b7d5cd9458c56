//! Payload assembly: project payment headers into tenant sales and render the
//! request body.
//!
//! Everything here is pure. The rendered body is sent verbatim by the
//! dispatcher, so rendering must be deterministic: keys in declaration order,
//! every key always present, two-space indentation.

use chrono::{NaiveDate, NaiveTime};
use possync_domain::constants::{RECEIPT_DATE_FORMAT, RECEIPT_TIME_FORMAT};
use possync_domain::{
    ItemRecord, PaymentRecord, PosSale, PosSyncError, Result, TenantConfig, TenantPayload,
};
use serde_json::Value;

/// Render a receipt date as `DD/MM/YYYY`.
pub fn format_receipt_date(date: NaiveDate) -> String {
    date.format(RECEIPT_DATE_FORMAT).to_string()
}

/// Render a receipt time as `HH:MM:SS`.
pub fn format_receipt_time(time: NaiveTime) -> String {
    time.format(RECEIPT_TIME_FORMAT).to_string()
}

/// Project a payment header into the sale shape of `tenant`'s API, merging
/// in the tenant codes and attaching `items`.
pub fn project_payment(
    payment: &PaymentRecord,
    tenant: &TenantConfig,
    items: Vec<ItemRecord>,
) -> PosSale {
    PosSale {
        property_code: tenant.property_code.clone(),
        pos_interface_code: tenant.pos_interface_code.clone(),
        receipt_no: payment.receipt_no.clone(),
        receipt_date: format_receipt_date(payment.receipt_date),
        receipt_time: format_receipt_time(payment.receipt_time),
        no_of_items: payment.no_of_items,
        sales_currency: payment.sales_currency.clone(),
        total_sales_amt_b4_tax: payment.total_sales_amt_b4_tax,
        total_sales_amt_after_tax: payment.total_sales_amt_after_tax,
        sales_tax_rate: payment.sales_tax_rate,
        service_charge_amt: payment.service_charge_amt,
        payment_amt: payment.payment_amt,
        payment_currency: payment.payment_currency.clone(),
        payment_method: payment.payment_method.clone(),
        sales_type: payment.sales_type.clone(),
        items,
    }
}

/// Build the payload for one tenant from its already projected sales.
pub fn assemble_payload(tenant: &TenantConfig, pos_sales: Vec<PosSale>) -> TenantPayload {
    TenantPayload {
        app_code: tenant.app_code.clone(),
        property_code: tenant.property_code.clone(),
        client_id: tenant.client_id.clone(),
        client_secret: tenant.client_secret.clone(),
        pos_interface_code: tenant.pos_interface_code.clone(),
        batch_code: tenant.batch_code.clone(),
        pos_sales,
    }
}

/// Trim every string in `value`, at any depth of objects and arrays.
/// Object keys are left as they are.
pub fn trim_strings(value: Value) -> Value {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.len() == text.len() {
                Value::String(text)
            } else {
                Value::String(trimmed.to_string())
            }
        }
        Value::Array(values) => Value::Array(values.into_iter().map(trim_strings).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(key, value)| (key, trim_strings(value))).collect())
        }
        other => other,
    }
}

/// Trimmed JSON value of `payload`.
pub fn payload_value(payload: &TenantPayload) -> Result<Value> {
    serde_json::to_value(payload)
        .map(trim_strings)
        .map_err(|e| PosSyncError::Internal(format!("Failed to serialize payload: {e}")))
}

/// Render the request body for `payload`: trimmed, pretty-printed with two
/// spaces.
pub fn render_payload(payload: &TenantPayload) -> Result<String> {
    let value = payload_value(payload)?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| PosSyncError::Internal(format!("Failed to render payload: {e}")))
}
