//! Observations, recommendations and category trends

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde_json::json;

use super::types::{Finding, Recommendation, RecommendationKind, Severity, Trend, TrendDirection};
use crate::models::{Priority, Transaction};
use crate::stats::{self, MonthKey};

/// Savings rate (percent) the advice aims for
const TARGET_SAVINGS_RATE: f64 = 20.0;

/// A category above this share of spend is called out
const CONCENTRATION_SHARE: f64 = 0.4;

/// Month-to-month variation above this earns a budgeting nudge
const UNSTABLE_CV: f64 = 0.3;

const TREND_MONTHS: usize = 6;

/// Short observations about savings and concentration
pub fn observations(expenses: &[&Transaction], income: f64) -> Vec<Finding> {
    let mut findings = Vec::new();
    let total = stats::total_amount(expenses);
    let rate = stats::savings_rate(expenses, income);

    if rate < TARGET_SAVINGS_RATE {
        findings.push(
            Finding::new(
                "savings:low_rate",
                Severity::Warning,
                "Low Savings Rate",
                format!(
                    "Your savings rate is {:.1}%. Consider increasing it to 20% for better financial health.",
                    rate
                ),
            )
            .with_action("Review your spending in high-cost categories")
            .with_data(json!({ "savings_rate": rate })),
        );
    }

    let totals = stats::category_totals(expenses);
    if let Some((category, amount)) = stats::top_category(&totals) {
        if total > 0.0 && amount > total * CONCENTRATION_SHARE {
            let share = amount / total * 100.0;
            findings.push(
                Finding::new(
                    format!("category:concentration:{}", category),
                    Severity::Info,
                    "High Category Concentration",
                    format!("{} accounts for {:.1}% of your expenses.", category, share),
                )
                .with_action("Consider diversifying your spending")
                .with_data(json!({ "category": category, "amount": amount, "share": share })),
            );
        }
    }

    findings
}

/// Actionable recommendations with estimated savings
pub fn recommendations(
    expenses: &[&Transaction],
    income: f64,
    as_of: NaiveDateTime,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let total = stats::total_amount(expenses);
    let rate = stats::savings_rate(expenses, income);

    if rate < TARGET_SAVINGS_RATE {
        let target = income.max(0.0) * TARGET_SAVINGS_RATE / 100.0;
        recommendations.push(Recommendation {
            kind: RecommendationKind::Savings,
            priority: Priority::High,
            title: "Increase Savings Rate".to_string(),
            description: format!(
                "Your current savings rate is {:.1}%. Aim for 20% or higher.",
                rate
            ),
            action: "Set up automatic transfers to savings account".to_string(),
            potential_savings: Some((target - (income.max(0.0) - total)).max(0.0)),
        });
    }

    let totals = stats::category_totals(expenses);
    if let Some((category, amount)) = stats::top_category(&totals) {
        if total > 0.0 && amount > total * CONCENTRATION_SHARE {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Category,
                priority: Priority::Medium,
                title: "Diversify Spending".to_string(),
                description: format!(
                    "{} accounts for {:.1}% of expenses.",
                    category,
                    amount / total * 100.0
                ),
                action: "Look for ways to reduce spending in this category".to_string(),
                potential_savings: Some(amount * 0.1),
            });
        }
    }

    let window = stats::trailing_months(as_of, TREND_MONTHS);
    let monthly_values: Vec<f64> = stats::monthly_category_totals(expenses)
        .values()
        .flat_map(|months| in_window(months, &window))
        .collect();
    if stats::coefficient_of_variation(&monthly_values) > UNSTABLE_CV {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Budget,
            priority: Priority::Medium,
            title: "Stabilize Spending".to_string(),
            description: "Your spending varies significantly month-to-month.".to_string(),
            action: "Create a monthly budget and track adherence".to_string(),
            potential_savings: None,
        });
    }

    recommendations
}

/// Per-category trend over the trailing months, for categories with at
/// least two months of data
pub fn trends(expenses: &[&Transaction], as_of: NaiveDateTime) -> Vec<Trend> {
    let window = stats::trailing_months(as_of, TREND_MONTHS);

    stats::monthly_category_totals(expenses)
        .into_iter()
        .filter_map(|(category, months)| {
            let values = in_window(&months, &window);
            if values.len() < 2 {
                return None;
            }
            let slope = stats::linear_trend(&values);
            Some(Trend {
                category,
                direction: TrendDirection::from_slope(slope),
                rate: slope.abs(),
                confidence: stats::trend_confidence(&values),
                months: values.len(),
            })
        })
        .collect()
}

/// Values for the months of `window` that have data, oldest first
fn in_window(months: &BTreeMap<MonthKey, f64>, window: &[MonthKey]) -> Vec<f64> {
    window.iter().filter_map(|m| months.get(m).copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, expense};

    fn titles_of(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn test_observations() {
        let txs = vec![
            expense(900.0, "rent", at(2026, 10, 1, 12)),
            expense(100.0, "food", at(2026, 10, 2, 12)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();

        let findings = observations(&refs, 1100.0);
        assert_eq!(titles_of(&findings), vec!["Low Savings Rate", "High Category Concentration"]);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[1].message, "rent accounts for 90.0% of your expenses.");

        // Healthy savings and an even split
        let txs = vec![
            expense(100.0, "rent", at(2026, 10, 1, 12)),
            expense(100.0, "food", at(2026, 10, 2, 12)),
            expense(100.0, "fun", at(2026, 10, 3, 12)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();
        assert!(observations(&refs, 1000.0).is_empty());
    }

    #[test]
    fn test_recommendations() {
        let txs = vec![
            expense(900.0, "rent", at(2026, 10, 1, 12)),
            expense(100.0, "food", at(2026, 10, 2, 12)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();

        let recs = recommendations(&refs, 1100.0, at(2026, 10, 16, 12));
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].kind, RecommendationKind::Savings);
        assert_eq!(recs[0].priority, Priority::High);
        // Target 220 saved, currently 100
        assert!((recs[0].potential_savings.unwrap() - 120.0).abs() < 1e-9);
        assert_eq!(recs[1].kind, RecommendationKind::Category);
        assert!((recs[1].potential_savings.unwrap() - 90.0).abs() < 1e-9);
        // 900 and 100 in the same month are far apart
        assert_eq!(recs[2].kind, RecommendationKind::Budget);
        assert_eq!(recs[2].potential_savings, None);
    }

    #[test]
    fn test_unstable_spending() {
        let txs = vec![
            expense(100.0, "food", at(2026, 8, 1, 12)),
            expense(400.0, "food", at(2026, 9, 1, 12)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();
        let recs = recommendations(&refs, 10_000.0, at(2026, 10, 16, 12));
        let kinds: Vec<RecommendationKind> = recs.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&RecommendationKind::Budget));
    }

    #[test]
    fn test_trends_are_chronological() {
        let txs = vec![
            expense(100.0, "food", at(2026, 7, 3, 12)),
            expense(200.0, "food", at(2026, 8, 3, 12)),
            expense(300.0, "food", at(2026, 9, 3, 12)),
            expense(500.0, "rent", at(2026, 8, 1, 12)),
            expense(400.0, "rent", at(2026, 9, 1, 12)),
            expense(50.0, "gifts", at(2026, 9, 9, 12)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();

        let trends = trends(&refs, at(2026, 10, 16, 12));
        assert_eq!(trends.len(), 2);

        let food = &trends[0];
        assert_eq!(food.category, "food");
        assert_eq!(food.direction, TrendDirection::Increasing);
        assert!((food.rate - 100.0).abs() < 1e-9);
        assert_eq!(food.months, 3);

        let rent = &trends[1];
        assert_eq!(rent.direction, TrendDirection::Decreasing);
        assert_eq!(rent.confidence, 0.5);
    }
}
