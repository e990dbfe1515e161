//! CSV export and import of the purchase collection.

use crate::store::{NewPurchase, Purchase};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;

pub const EXPORT_COLUMNS: [&str; 5] = [
    "id",
    "purchase_date",
    "purchase_price",
    "grams",
    "description",
];

const REQUIRED_COLUMNS: [&str; 3] = ["purchase_date", "purchase_price", "grams"];

pub fn export_csv(purchases: &[Purchase]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_COLUMNS)?;
    for p in purchases {
        writer.write_record([
            p.id.as_str(),
            p.purchase_date.as_str(),
            &p.purchase_price.to_string(),
            &p.grams.to_string(),
            p.description.as_str(),
        ])?;
    }
    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

/// Outcome of parsing an uploaded CSV. Rows are validated independently, so
/// one bad row never aborts the batch.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub records: Vec<NewPurchase>,
    pub error_count: usize,
}

/// Parses purchase rows out of CSV content. Fails outright only when the
/// header is missing a required column. Any id column in the file is
/// ignored; the store assigns fresh ids on insert.
pub fn parse_csv(content: &[u8]) -> Result<ImportReport> {
    let mut reader = csv::Reader::from_reader(content);
    let headers = reader.headers()?.clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(anyhow!("Missing required field: {column}"));
        }
    }

    let mut report = ImportReport::default();
    for record in reader.records() {
        let Ok(record) = record else {
            report.error_count += 1;
            continue;
        };
        match parse_row(&headers, &record) {
            Some(row) => report.records.push(row),
            None => report.error_count += 1,
        }
    }
    Ok(report)
}

fn column<'a>(headers: &csv::StringRecord, record: &'a csv::StringRecord, name: &str) -> &'a str {
    headers
        .iter()
        .position(|h| h == name)
        .and_then(|i| record.get(i))
        .unwrap_or("")
}

fn parse_row(headers: &csv::StringRecord, record: &csv::StringRecord) -> Option<NewPurchase> {
    let purchase_date = column(headers, record, "purchase_date").trim();
    let purchase_price = column(headers, record, "purchase_price").trim();
    let grams = column(headers, record, "grams").trim();

    if purchase_date.is_empty() || purchase_price.is_empty() || grams.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(purchase_date, "%Y-%m-%d").ok()?;

    Some(NewPurchase {
        purchase_date: purchase_date.to_string(),
        purchase_price: purchase_price.parse().ok()?,
        grams: grams.parse().ok()?,
        description: column(headers, record, "description").trim().to_string(),
    })
}
