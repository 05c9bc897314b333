//! Financial health score
//!
//! Five capped components add up to at most 100:
//!
//! | Component | Max |
//! |---|---|
//! | Savings rate | 30 |
//! | Budget adherence | 25 |
//! | Category diversity | 20 |
//! | Emergency fund | 15 |
//! | Spending consistency | 10 |

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Transaction;
use crate::stats;

/// Months of history the consistency component looks at
const CONSISTENCY_MONTHS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HealthBreakdown {
    pub savings: f64,
    pub budget: f64,
    pub diversity: f64,
    pub emergency_fund: f64,
    pub consistency: f64,
}

impl HealthBreakdown {
    pub fn total(&self) -> f64 {
        self.savings + self.budget + self.diversity + self.emergency_fund + self.consistency
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// 0 to 100
    pub score: u8,
    pub breakdown: HealthBreakdown,
}

/// Figures the score is computed from
#[derive(Debug, Clone, Copy)]
pub struct HealthInput<'a> {
    pub expenses: &'a [&'a Transaction],
    pub income: f64,
    pub savings_balance: f64,
    pub monthly_budget: f64,
    pub as_of: NaiveDateTime,
}

pub fn health_score(input: &HealthInput<'_>) -> HealthScore {
    let total = stats::total_amount(input.expenses);

    let breakdown = HealthBreakdown {
        savings: savings_component(stats::savings_rate(input.expenses, input.income)),
        budget: budget_component(total, input.monthly_budget),
        diversity: diversity_component(input.expenses),
        emergency_fund: emergency_fund_component(input.savings_balance, total),
        consistency: consistency_component(input.expenses, input.as_of),
    };

    let score = breakdown.total().round().clamp(0.0, 100.0) as u8;
    HealthScore { score, breakdown }
}

fn savings_component(rate: f64) -> f64 {
    if rate >= 20.0 {
        30.0
    } else if rate >= 10.0 {
        20.0
    } else if rate >= 5.0 {
        10.0
    } else {
        0.0
    }
}

fn budget_component(total: f64, budget: f64) -> f64 {
    if total <= budget {
        return 25.0;
    }
    if budget <= 0.0 {
        return 0.0;
    }
    let overage = total - budget;
    (25.0 - overage / budget * 25.0).max(0.0)
}

fn diversity_component(expenses: &[&Transaction]) -> f64 {
    let categories: HashSet<&str> = expenses.iter().map(|t| t.category_or_other()).collect();
    (categories.len() as f64 * 2.0).min(20.0)
}

fn emergency_fund_component(savings: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return if savings > 0.0 { 15.0 } else { 0.0 };
    }
    let ratio = savings / (total * 3.0);
    if ratio >= 1.0 {
        15.0
    } else if ratio >= 0.5 {
        10.0
    } else if ratio >= 0.25 {
        5.0
    } else {
        0.0
    }
}

fn consistency_component(expenses: &[&Transaction], as_of: NaiveDateTime) -> f64 {
    let window = stats::trailing_months(as_of, CONSISTENCY_MONTHS);
    let monthly = stats::monthly_totals(expenses);
    let values: Vec<f64> = window
        .iter()
        .filter_map(|m| monthly.get(m).copied())
        .collect();

    (10.0 - stats::coefficient_of_variation(&values) * 10.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, expense};

    fn input<'a>(
        expenses: &'a [&'a Transaction],
        income: f64,
        savings: f64,
        budget: f64,
    ) -> HealthInput<'a> {
        HealthInput {
            expenses,
            income,
            savings_balance: savings,
            monthly_budget: budget,
            as_of: at(2026, 10, 16, 12),
        }
    }

    #[test]
    fn test_perfect_score() {
        let categories = [
            "food", "rent", "utilities", "travel", "fun", "health", "books", "gifts", "pets",
            "auto",
        ];
        let txs: Vec<Transaction> = categories
            .iter()
            .map(|c| expense(10.0, c, at(2026, 10, 2, 12)))
            .collect();
        let refs: Vec<&Transaction> = txs.iter().collect();

        let health = health_score(&input(&refs, 1000.0, 1000.0, 500.0));
        assert_eq!(health.breakdown.savings, 30.0);
        assert_eq!(health.breakdown.budget, 25.0);
        assert_eq!(health.breakdown.diversity, 20.0);
        assert_eq!(health.breakdown.emergency_fund, 15.0);
        assert_eq!(health.breakdown.consistency, 10.0);
        assert_eq!(health.score, 100);
    }

    #[test]
    fn test_zero_income_and_budget() {
        let txs = vec![expense(100.0, "food", at(2026, 10, 2, 12))];
        let refs: Vec<&Transaction> = txs.iter().collect();

        let health = health_score(&input(&refs, 0.0, 0.0, 0.0));
        assert_eq!(health.breakdown.savings, 0.0);
        assert_eq!(health.breakdown.budget, 0.0);
        assert_eq!(health.breakdown.diversity, 2.0);
        assert_eq!(health.breakdown.emergency_fund, 0.0);
        assert_eq!(health.score, 12);
    }

    #[test]
    fn test_empty_history() {
        let health = health_score(&input(&[], 0.0, 500.0, 0.0));
        // Budget met, fund covers nothing spent, no variation
        assert_eq!(health.breakdown.budget, 25.0);
        assert_eq!(health.breakdown.emergency_fund, 15.0);
        assert_eq!(health.breakdown.consistency, 10.0);
        assert_eq!(health.score, 50);
    }

    #[test]
    fn test_budget_overage_scales_down() {
        let txs = vec![expense(1200.0, "rent", at(2026, 10, 2, 12))];
        let refs: Vec<&Transaction> = txs.iter().collect();
        let health = health_score(&input(&refs, 0.0, 0.0, 1000.0));
        assert_eq!(health.breakdown.budget, 20.0);

        let health = health_score(&input(&refs, 0.0, 0.0, 500.0));
        assert_eq!(health.breakdown.budget, 0.0);
    }

    #[test]
    fn test_inconsistent_months_lose_points() {
        let txs = vec![
            expense(100.0, "food", at(2026, 8, 2, 12)),
            expense(300.0, "food", at(2026, 9, 2, 12)),
            // Too old to count
            expense(5000.0, "food", at(2025, 1, 2, 12)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();
        let health = health_score(&input(&refs, 0.0, 0.0, 0.0));
        // Mean 200, std 100
        assert!((health.breakdown.consistency - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_bounds() {
        let txs = vec![
            expense(10_000.0, "food", at(2026, 10, 2, 12)),
            expense(1.0, "rent", at(2026, 3, 2, 12)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();
        for (income, savings, budget) in [(0.0, 0.0, 0.0), (1e9, 1e9, 1e9), (10.0, -5.0, 1.0)] {
            let health = health_score(&input(&refs, income, savings, budget));
            assert!(health.score <= 100);
        }
    }
}
