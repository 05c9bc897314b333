//! Test utilities for spendwise-core
//!
//! Small builders for transactions and timestamps, shared by unit tests,
//! the integration tests and the CLI tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Transaction, TransactionKind};

/// Timestamp at the top of the given hour
///
/// Panics on an invalid date, which is what a test wants.
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or_else(|| panic!("invalid test date {year}-{month}-{day} {hour}:00"))
}

/// Categorized expense without a description
pub fn expense(amount: f64, category: &str, date: NaiveDateTime) -> Transaction {
    Transaction {
        id: format!("exp-{}-{}", category, date.and_utc().timestamp()),
        amount,
        category: Some(category.to_string()),
        description: None,
        date: Some(date),
        kind: TransactionKind::Expense,
    }
}

/// Uncategorized expense with a merchant description
pub fn purchase(amount: f64, description: &str, date: NaiveDateTime) -> Transaction {
    Transaction {
        id: format!("buy-{}-{}", description, date.and_utc().timestamp()),
        amount,
        category: None,
        description: Some(description.to_string()),
        date: Some(date),
        kind: TransactionKind::Expense,
    }
}

pub fn income(amount: f64, date: NaiveDateTime) -> Transaction {
    Transaction {
        id: format!("inc-{}", date.and_utc().timestamp()),
        amount,
        category: Some("salary".to_string()),
        description: Some("Payroll".to_string()),
        date: Some(date),
        kind: TransactionKind::Income,
    }
}
