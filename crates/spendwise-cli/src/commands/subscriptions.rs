//! Recurring charge and bill command implementations

use std::path::Path;

use anyhow::Result;
use spendwise_core::config::MAX_SPAN_DAYS;
use spendwise_core::detect::{BillKind, ChargeSource};
use spendwise_core::models::{self, BillStatus};

use super::{load_engine, load_transactions, print_json, resolve_as_of, truncate};

pub fn cmd_subscriptions(
    config: Option<&Path>,
    file: &Path,
    as_of: Option<&str>,
    json: bool,
) -> Result<()> {
    let engine = load_engine(config)?;
    let transactions = engine.categorized(&load_transactions(file)?);
    let as_of = resolve_as_of(as_of)?;

    let charges = engine
        .recurrence()
        .detect(&models::expenses(&transactions), as_of);

    if json {
        return print_json(&charges);
    }

    if charges.is_empty() {
        println!("No recurring charges found. Three or more similar charges are needed");
        println!("unless the merchant is a known service.");
        return Ok(());
    }

    println!();
    println!("📋 Recurring Charges");
    println!("   ─────────────────────────────────────────────────────────────");

    for charge in &charges {
        let status_icon = match charge.status {
            BillStatus::Overdue => "🔴",
            BillStatus::DueSoon => "🟡",
            BillStatus::Upcoming => "🔵",
            BillStatus::Active => "✅",
        };
        let source = match charge.source {
            ChargeSource::Catalog => "known",
            ChargeSource::Detected => "pattern",
        };

        println!(
            "   {} {:20} │ {:>8}/{:<7} │ next {} │ {}",
            status_icon,
            truncate(&charge.name, 20),
            format!("${:.2}", charge.amount),
            charge.frequency.as_str(),
            charge.next_due.date(),
            source
        );
    }

    Ok(())
}

pub fn cmd_bills(
    config: Option<&Path>,
    file: &Path,
    days: Option<i64>,
    as_of: Option<&str>,
    json: bool,
) -> Result<()> {
    let engine = load_engine(config)?;
    let transactions = engine.categorized(&load_transactions(file)?);
    let as_of = resolve_as_of(as_of)?;
    let window = days.unwrap_or_else(|| engine.bill_window_days());
    if !(0..=MAX_SPAN_DAYS).contains(&window) {
        anyhow::bail!("--days must be between 0 and {}", MAX_SPAN_DAYS);
    }

    let expenses = models::expenses(&transactions);
    let charges = engine.recurrence().detect(&expenses, as_of);
    let bills = engine
        .recurrence()
        .upcoming_bills(&charges, &expenses, as_of, window);

    if json {
        return print_json(&bills);
    }

    if bills.is_empty() {
        println!("No bills due in the next {} days.", window);
        return Ok(());
    }

    println!();
    println!("📅 Bills Due in the Next {} Days", window);
    println!("   ─────────────────────────────────────────────────────────────");

    let mut total = 0.0;
    for bill in &bills {
        let icon = match bill.kind {
            BillKind::Subscription => "🔁",
            BillKind::Predicted => "🔮",
        };
        total += bill.amount;

        println!(
            "   {} {:20} │ {:>10} │ {} │ {:14} │ {:.0}%",
            icon,
            truncate(&bill.name, 20),
            format!("${:.2}", bill.amount),
            bill.due_date.date(),
            bill.category,
            bill.confidence * 100.0
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total: ${:.2}", total);

    Ok(())
}
