//! Unusually large recent expenses
//!
//! The mean is taken over a category's whole history; only the most recent
//! few charges are candidates.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Transaction;
use crate::stats;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub transaction_id: String,
    pub category: String,
    pub amount: f64,
    /// Category mean the amount was compared against
    pub average: f64,
    /// amount / average
    pub severity: f64,
    pub occurred_at: Option<NaiveDateTime>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    /// Flag amounts above `average * threshold`
    threshold: f64,
    /// How many of the latest charges per category are checked
    recent_window: usize,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl AnomalyDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            recent_window: 5,
        }
    }

    pub fn with_recent_window(mut self, recent_window: usize) -> Self {
        self.recent_window = recent_window;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Anomalies grouped by category name, oldest first within a category
    pub fn detect(&self, expenses: &[&Transaction]) -> Vec<Anomaly> {
        let mut by_category: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
        for tx in expenses {
            by_category
                .entry(tx.category_or_other())
                .or_default()
                .push(tx);
        }

        let mut anomalies = Vec::new();
        for (category, mut group) in by_category {
            let amounts: Vec<f64> = group.iter().map(|t| t.amount).collect();
            let average = stats::mean(&amounts);
            if average <= 0.0 {
                continue;
            }

            // Undated charges sort first so they never count as recent
            group.sort_by_key(|t| t.date);
            let skip = group.len().saturating_sub(self.recent_window);

            for tx in &group[skip..] {
                if tx.amount > average * self.threshold {
                    anomalies.push(Anomaly {
                        transaction_id: tx.id.clone(),
                        category: category.to_string(),
                        amount: tx.amount,
                        average,
                        severity: tx.amount / average,
                        occurred_at: tx.date,
                        description: tx.description.clone(),
                    });
                }
            }
        }

        anomalies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, expense};

    fn category(amounts: &[f64]) -> Vec<Transaction> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| expense(*a, "food", at(2026, 9, i as u32 + 1, 12)))
            .collect()
    }

    #[test]
    fn test_flags_large_recent_charge() {
        // Mean 9.6; 24 is 2.5x the mean
        let txs = category(&[6.0, 6.0, 6.0, 6.0, 24.0]);
        let refs: Vec<&Transaction> = txs.iter().collect();

        let anomalies = AnomalyDetector::default().detect(&refs);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].amount, 24.0);
        assert!((anomalies[0].average - 9.6).abs() < 1e-9);
        assert!((anomalies[0].severity - 2.5).abs() < 1e-9);
        assert_eq!(anomalies[0].occurred_at, Some(at(2026, 9, 5, 12)));
    }

    #[test]
    fn test_moderate_charge_not_flagged() {
        // Mean 8; 12 is 1.5x the mean
        let txs = category(&[7.0, 7.0, 7.0, 7.0, 12.0]);
        let refs: Vec<&Transaction> = txs.iter().collect();
        assert!(AnomalyDetector::default().detect(&refs).is_empty());
    }

    #[test]
    fn test_only_recent_charges_checked() {
        // The spike is the oldest of six, outside the last five
        let txs = category(&[100.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        let refs: Vec<&Transaction> = txs.iter().collect();
        assert!(AnomalyDetector::default().detect(&refs).is_empty());

        let wide = AnomalyDetector::default().with_recent_window(6);
        assert_eq!(wide.detect(&refs).len(), 1);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let txs = category(&[7.0, 7.0, 7.0, 7.0, 12.0]);
        let refs: Vec<&Transaction> = txs.iter().collect();
        assert_eq!(AnomalyDetector::new(1.4).detect(&refs).len(), 1);
    }

    #[test]
    fn test_single_charge_never_flagged() {
        let txs = category(&[500.0]);
        let refs: Vec<&Transaction> = txs.iter().collect();
        assert!(AnomalyDetector::default().detect(&refs).is_empty());
    }
}
