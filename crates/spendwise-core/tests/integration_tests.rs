//! Integration tests for spendwise-core
//!
//! These tests exercise the full load → analyze → apply workflow.

use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use spendwise_core::{
    detect::ChargeSource,
    import::{load_transactions, parse_transactions_csv},
    models::TransactionKind,
    AnalysisRequest, EngineConfig, InsightEngine, UserProfile,
};

/// Bank-style export: negative amounts are expenses, no categories.
/// Contains:
/// - a catalog subscription (Netflix)
/// - a monthly utility bill found by pattern (4 charges, same amount)
/// - rent, coffee and a shopping outlier (Best Buy)
fn bank_export_csv() -> &'static str {
    r#"Date,Description,Amount,Category
10/01/2026,Payroll,4000.00,
08/01/2026,Rent - Oak Apartments,-1500.00,
09/01/2026,Rent - Oak Apartments,-1500.00,
10/01/2026,Rent - Oak Apartments,-1500.00,
08/20/2026,NETFLIX.COM,-15.99,
09/20/2026,NETFLIX.COM,-15.99,
07/05/2026,CITY WATER UTIL,-45.00,
08/05/2026,CITY WATER UTIL,-45.00,
09/05/2026,CITY WATER UTIL,-45.00,
10/05/2026,CITY WATER UTIL,-45.00,
10/02/2026,Starbucks,-5.50,
10/09/2026,Starbucks,-5.50,
08/12/2026,Target run,-25.00,
09/14/2026,Mall shoes,-40.00,
10/15/2026,Best Buy electronics,-900.00,"#
}

fn as_of() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid date")
}

#[test]
fn test_full_analysis_workflow() {
    let transactions =
        parse_transactions_csv(bank_export_csv().as_bytes()).expect("Failed to parse CSV");
    assert_eq!(transactions.len(), 15);
    assert_eq!(transactions[0].kind, TransactionKind::Income);
    assert!(transactions[1..]
        .iter()
        .all(|t| t.kind == TransactionKind::Expense && t.amount > 0.0));

    let engine = InsightEngine::new(&EngineConfig::default());
    let profile = UserProfile {
        name: Some("Riley".into()),
        savings_balance: 2000.0,
        ..Default::default()
    };
    let bundle = engine.analyze(&AnalysisRequest::new(&transactions, &profile, as_of()));

    // Recurring charges
    let netflix = bundle
        .subscriptions
        .iter()
        .find(|c| c.name == "Netflix")
        .expect("Netflix should come from the catalog");
    assert_eq!(netflix.source, ChargeSource::Catalog);

    let water = bundle
        .subscriptions
        .iter()
        .find(|c| c.name == "CITY WATER UTIL")
        .expect("Water bill should be detected by pattern");
    assert_eq!(water.source, ChargeSource::Detected);
    assert!((water.amount - 45.0).abs() < 1e-9);

    // Netflix was last paid 9/20, so it is due 10/20
    assert!(bundle
        .upcoming_bills
        .iter()
        .any(|b| b.name == "Netflix" && b.due_date.date() == NaiveDate::from_ymd_opt(2026, 10, 20).expect("valid date")));

    // Best Buy is far above the shopping average
    assert_eq!(bundle.anomalies.len(), 1);
    assert_eq!(bundle.anomalies[0].category, "shopping");
    assert_eq!(bundle.anomalies[0].amount, 900.0);

    // Three months of expenses against one month of income
    assert!(bundle.health.score <= 100);
    assert!(bundle
        .insights
        .iter()
        .any(|f| f.title == "Low Savings Rate"));

    let json = serde_json::to_value(&bundle).expect("bundle serializes");
    for key in ["health", "notifications", "level_info", "challenge_progress"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn test_applied_achievements_do_not_unlock_twice() {
    let transactions = parse_transactions_csv(bank_export_csv().as_bytes()).unwrap();
    let engine = InsightEngine::default();
    let profile = UserProfile::default();

    let first = engine.analyze(&AnalysisRequest::new(&transactions, &profile, as_of()));
    assert!(!first.new_achievements.is_empty());

    let updated = first.new_achievements.applied_to(&profile);
    assert_eq!(updated.total_points, first.new_achievements.points_earned);

    let second = engine.analyze(&AnalysisRequest::new(&transactions, &updated, as_of()));
    assert!(second.new_achievements.is_empty());
    assert_eq!(second.level_info, first.level_info);
}

#[test]
fn test_json_transactions_and_custom_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(
        &path,
        r#"[
            {"amount": 12.0, "description": "Lunch", "date": "2026-10-14"},
            {"amount": 14.0, "description": "Lunch", "date": "2026-10-15"},
            {"amount": 80.0, "description": "Lunch", "date": "2026-10-16T13:00:00"},
            {"amount": 2500.0, "kind": "income", "date": "2026-10-01"}
        ]"#,
    )
    .unwrap();

    let transactions = load_transactions(&path).unwrap();
    assert_eq!(transactions.len(), 4);
    assert!(transactions.iter().all(|t| !t.id.is_empty()));

    // With the default 2x threshold the 80 lunch stands out
    let profile = UserProfile::default();
    let bundle = InsightEngine::default().analyze(&AnalysisRequest::new(
        &transactions,
        &profile,
        as_of(),
    ));
    assert_eq!(bundle.anomalies.len(), 1);

    let config = EngineConfig::from_toml("[analysis]\nanomaly_threshold = 3.0\n").unwrap();
    let bundle = InsightEngine::new(&config).analyze(&AnalysisRequest::new(
        &transactions,
        &profile,
        as_of(),
    ));
    assert!(bundle.anomalies.is_empty());
}
