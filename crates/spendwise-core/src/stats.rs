//! Statistics helpers shared by the analyzers
//!
//! All helpers are total: empty input, zero means and undated records give
//! neutral results instead of errors.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDateTime};

use crate::models::Transaction;

/// Calendar month key (year, month)
pub type MonthKey = (i32, u32);

pub fn month_key(date: NaiveDateTime) -> MonthKey {
    (date.year(), date.month())
}

/// The month after `key`
pub fn next_month(key: MonthKey) -> MonthKey {
    if key.1 == 12 {
        (key.0 + 1, 1)
    } else {
        (key.0, key.1 + 1)
    }
}

/// The `count` calendar months ending with the month of `as_of`, oldest first
pub fn trailing_months(as_of: NaiveDateTime, count: usize) -> Vec<MonthKey> {
    let mut months = Vec::with_capacity(count);
    let (mut year, mut month) = month_key(as_of);
    for _ in 0..count {
        months.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    months.reverse();
    months
}

pub fn total_amount(transactions: &[&Transaction]) -> f64 {
    transactions.iter().map(|t| t.amount).sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation over the mean; 0 for fewer than two values
/// or a zero mean
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    if avg == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / avg
}

/// Least-squares slope of `values` against their index
pub fn linear_trend(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }

    let sum_x = n * (n - 1.0) / 2.0;
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, v)| i as f64 * v).sum();
    let sum_x2: f64 = (0..values.len()).map(|i| (i * i) as f64).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// How much to trust a trend: 0.5 with fewer than three points, otherwise
/// one minus the coefficient of variation, floored at 0.1
pub fn trend_confidence(values: &[f64]) -> f64 {
    if values.len() < 3 {
        return 0.5;
    }
    (1.0 - coefficient_of_variation(values)).max(0.1)
}

/// Summed amount per category (uncategorized records land in "other")
pub fn category_totals(expenses: &[&Transaction]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for tx in expenses {
        *totals.entry(tx.category_or_other().to_string()).or_insert(0.0) += tx.amount;
    }
    totals
}

/// Category with the largest total (ties go to the first name alphabetically)
pub fn top_category(totals: &BTreeMap<String, f64>) -> Option<(&str, f64)> {
    totals
        .iter()
        .fold(None, |best: Option<(&str, f64)>, (name, &total)| match best {
            Some((_, best_total)) if best_total >= total => best,
            _ => Some((name.as_str(), total)),
        })
}

/// Summed amount per calendar month, dated records only
pub fn monthly_totals(expenses: &[&Transaction]) -> BTreeMap<MonthKey, f64> {
    let mut totals = BTreeMap::new();
    for tx in expenses {
        if let Some(date) = tx.date {
            *totals.entry(month_key(date)).or_insert(0.0) += tx.amount;
        }
    }
    totals
}

/// Per category, summed amount per calendar month, dated records only
pub fn monthly_category_totals(
    expenses: &[&Transaction],
) -> BTreeMap<String, BTreeMap<MonthKey, f64>> {
    let mut totals: BTreeMap<String, BTreeMap<MonthKey, f64>> = BTreeMap::new();
    for tx in expenses {
        if let Some(date) = tx.date {
            *totals
                .entry(tx.category_or_other().to_string())
                .or_default()
                .entry(month_key(date))
                .or_insert(0.0) += tx.amount;
        }
    }
    totals
}

/// Distinct calendar months with dated records, at least 1
pub fn months_covered(expenses: &[&Transaction]) -> usize {
    let months: BTreeSet<MonthKey> = expenses
        .iter()
        .filter_map(|t| t.date.map(month_key))
        .collect();
    months.len().max(1)
}

/// Dated spend divided by the number of days from first to last record,
/// inclusive
pub fn average_daily_spending(expenses: &[&Transaction]) -> f64 {
    let dated: Vec<(NaiveDateTime, f64)> = expenses
        .iter()
        .filter_map(|t| t.date.map(|d| (d, t.amount)))
        .collect();

    let (Some(first), Some(last)) = (
        dated.iter().map(|(d, _)| d.date()).min(),
        dated.iter().map(|(d, _)| d.date()).max(),
    ) else {
        return 0.0;
    };

    let days = (last - first).num_days() + 1;
    dated.iter().map(|(_, a)| a).sum::<f64>() / days as f64
}

/// Percentage of income left after expenses; 0 when there is no income
pub fn savings_rate(expenses: &[&Transaction], income: f64) -> f64 {
    if !income.is_finite() || income <= 0.0 {
        return 0.0;
    }
    (income - total_amount(expenses)) / income * 100.0
}
