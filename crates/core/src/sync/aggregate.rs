//! Fold payment rows into one header per receipt number.

use std::collections::{BTreeMap, BTreeSet};

use possync_domain::{PaymentLine, PaymentRecord};

struct ReceiptAccumulator {
    record: PaymentRecord,
    methods: BTreeSet<String>,
}

impl ReceiptAccumulator {
    fn start(line: PaymentLine) -> Self {
        let mut methods = BTreeSet::new();
        insert_method(&mut methods, &line.payment_method);

        let record = PaymentRecord {
            receipt_no: line.receipt_no,
            receipt_date: line.receipt_date,
            receipt_time: line.receipt_time,
            no_of_items: line.no_of_items,
            sales_currency: line.sales_currency,
            total_sales_amt_b4_tax: line.total_sales_amt_b4_tax,
            total_sales_amt_after_tax: line.total_sales_amt_after_tax,
            sales_tax_rate: line.sales_tax_rate,
            service_charge_amt: line.service_charge_amt,
            payment_amt: line.payment_amt,
            payment_currency: line.payment_currency,
            payment_method: String::new(),
            sales_type: line.sales_type,
        };

        Self { record, methods }
    }

    fn absorb(&mut self, line: PaymentLine) {
        let record = &mut self.record;

        record.receipt_date = record.receipt_date.max(line.receipt_date);
        record.receipt_time = record.receipt_time.max(line.receipt_time);
        record.no_of_items += line.no_of_items;
        record.total_sales_amt_b4_tax += line.total_sales_amt_b4_tax;
        record.total_sales_amt_after_tax += line.total_sales_amt_after_tax;
        record.sales_tax_rate += line.sales_tax_rate;
        record.service_charge_amt += line.service_charge_amt;
        record.payment_amt += line.payment_amt;
        keep_max(&mut record.sales_currency, line.sales_currency);
        keep_max(&mut record.payment_currency, line.payment_currency);
        keep_max(&mut record.sales_type, line.sales_type);

        insert_method(&mut self.methods, &line.payment_method);
    }

    fn finish(mut self) -> PaymentRecord {
        self.record.payment_method = self.methods.into_iter().collect::<Vec<_>>().join(",");
        self.record
    }
}

fn keep_max(current: &mut String, candidate: String) {
    if candidate > *current {
        *current = candidate;
    }
}

fn insert_method(methods: &mut BTreeSet<String>, method: &str) {
    let method = method.trim();
    if !method.is_empty() {
        methods.insert(method.to_string());
    }
}

/// Group payment rows by receipt number.
///
/// Amounts, item counts and tax rates are summed; date, time, currencies and
/// sales type take the maximum; payment methods are joined with `,` as a
/// sorted distinct list. Bookkeeping columns (row id, upload marker, insert
/// time) are dropped. Output is ordered by receipt number.
pub fn aggregate_payment_lines(lines: Vec<PaymentLine>) -> Vec<PaymentRecord> {
    let mut receipts: BTreeMap<String, ReceiptAccumulator> = BTreeMap::new();

    for line in lines {
        match receipts.get_mut(&line.receipt_no) {
            Some(acc) => acc.absorb(line),
            None => {
                receipts.insert(line.receipt_no.clone(), ReceiptAccumulator::start(line));
            }
        }
    }

    receipts.into_values().map(ReceiptAccumulator::finish).collect()
}
