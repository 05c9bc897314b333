//! Transaction and profile loaders
//!
//! Input files come from whatever persistence layer the caller uses. CSV files
//! are mapped by header name, so column order does not matter:
//!
//! | Column | Aliases | Required |
//! |---|---|---|
//! | amount | | yes |
//! | date | transaction date, timestamp | no |
//! | description | memo, name, merchant | no |
//! | category | | no |
//! | kind | type | no |
//! | id | | no |
//!
//! Without a `kind` column the bank convention applies: negative amounts are
//! expenses, positive amounts are income. Rows are never rejected for bad
//! values; a bad date becomes `None` and a bad amount becomes `0.0`, both of
//! which the engine leaves out of its calculations.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionKind, UserProfile};

/// Resolved column positions for a CSV header
#[derive(Debug, Default)]
struct ColumnMap {
    id: Option<usize>,
    date: Option<usize>,
    description: Option<usize>,
    amount: usize,
    category: Option<usize>,
    kind: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };

        let amount = find(&["amount"])
            .ok_or_else(|| Error::Import("Missing amount column".into()))?;

        Ok(Self {
            id: find(&["id"]),
            date: find(&["date", "transaction date", "timestamp"]),
            description: find(&["description", "memo", "name", "merchant"]),
            amount,
            category: find(&["category"]),
            kind: find(&["kind", "type"]),
        })
    }
}

/// Parse transactions from CSV data
pub fn parse_transactions_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;
    let mut transactions = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::to_string)
                .filter(|s| !s.is_empty())
        };

        let date_str = field(columns.date);
        let date = date_str.as_deref().and_then(parse_datetime);
        if date.is_none() {
            if let Some(raw) = &date_str {
                warn!(row, date = raw.as_str(), "Unparsable date, row kept without a date");
            }
        }

        let description = field(columns.description);
        let category = field(columns.category);

        let amount_str = record.get(columns.amount).unwrap_or("");
        let signed = match parse_amount(amount_str) {
            Ok(amount) => amount,
            Err(e) => {
                warn!(row, error = %e, "Unparsable amount, row will be skipped in totals");
                0.0
            }
        };

        let kind = field(columns.kind)
            .and_then(|k| k.parse::<TransactionKind>().ok())
            .unwrap_or(if signed < 0.0 {
                TransactionKind::Expense
            } else {
                TransactionKind::Income
            });

        let id = field(columns.id).unwrap_or_else(|| {
            generate_id(
                date_str.as_deref().unwrap_or(""),
                description.as_deref().unwrap_or(""),
                signed,
                row,
            )
        });

        transactions.push(Transaction {
            id,
            amount: signed.abs(),
            category,
            description,
            date,
            kind,
        });
    }

    debug!("Parsed {} transactions from CSV", transactions.len());
    Ok(transactions)
}

/// Parse transactions from a JSON array
///
/// Fields are read leniently (see [`Transaction`]); a record that still can't
/// be read, such as a bare number in the array, is skipped with a warning.
pub fn parse_transactions_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let records: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let mut transactions = Vec::with_capacity(records.len());

    for (row, record) in records.into_iter().enumerate() {
        let mut tx: Transaction = match serde_json::from_value(record) {
            Ok(tx) => tx,
            Err(e) => {
                warn!(row, error = %e, "Unreadable transaction record, skipping");
                continue;
            }
        };
        if tx.id.is_empty() {
            let date = tx.date.map(|d| d.to_string()).unwrap_or_default();
            tx.id = generate_id(
                &date,
                tx.description.as_deref().unwrap_or(""),
                tx.amount,
                row,
            );
        }
        transactions.push(tx);
    }

    debug!("Parsed {} transactions from JSON", transactions.len());
    Ok(transactions)
}

/// Load transactions from a file, picking the format from its extension
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        parse_transactions_json(file)
    } else {
        parse_transactions_csv(file)
    }
}

/// Load a user profile from a JSON file
pub fn load_profile(path: &Path) -> Result<UserProfile> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Stable id for rows that arrive without one
fn generate_id(date: &str, description: &str, amount: f64, row: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(row.to_be_bytes());
    hex::encode(hasher.finalize())[..16].to_string()
}

/// Parse a timestamp in the formats transaction exports commonly use
///
/// Date-only values land at noon so they don't read as late-night spending.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    let datetime_formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let date_formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
    ];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(12, 0, 0);
        }
    }

    None
}

/// Parse an amount string, handling currency symbols and commas
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}
