//! Recurring charge detection
//!
//! Two passes over the expense stream:
//! - Catalog match: known services recognized by keyword and expected price
//! - Pattern match: groups of similar descriptions with stable amounts and a
//!   regular weekly, monthly or yearly spacing
//!
//! Charges due inside the bill window become [`UpcomingBill`]s, together with
//! next month's bill per category forecast from the monthly average.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{days_until, BillStatus, Frequency, Transaction};
use crate::stats::{self, month_key, next_month};

/// A service recognized by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownService {
    pub name: String,
    pub keywords: Vec<String>,
    /// Expected charge; matches must be within the catalog tolerance
    pub amount: f64,
    pub frequency: Frequency,
}

impl KnownService {
    pub fn new(name: &str, keywords: &[&str], amount: f64, frequency: Frequency) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            amount,
            frequency,
        }
    }

    fn matches(&self, tx: &Transaction, tolerance: f64) -> bool {
        let text = tx.match_text();
        let keyword_hit = self
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .any(|k| text.contains(&k));

        keyword_hit && (tx.amount - self.amount).abs() < tolerance
    }
}

/// Built-in service catalog
pub fn default_catalog() -> Vec<KnownService> {
    vec![
        KnownService::new("Netflix", &["netflix"], 15.99, Frequency::Monthly),
        KnownService::new("Spotify", &["spotify"], 9.99, Frequency::Monthly),
        KnownService::new(
            "Amazon Prime",
            &["amazon prime", "prime"],
            12.99,
            Frequency::Monthly,
        ),
        KnownService::new(
            "Gym Membership",
            &["gym", "fitness", "planet fitness"],
            25.0,
            Frequency::Monthly,
        ),
        KnownService::new(
            "Phone Bill",
            &["verizon", "att", "tmobile", "sprint"],
            80.0,
            Frequency::Monthly,
        ),
        KnownService::new(
            "Internet",
            &["comcast", "xfinity", "spectrum"],
            60.0,
            Frequency::Monthly,
        ),
    ]
}

/// How a recurring charge was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeSource {
    Catalog,
    Detected,
}

/// A subscription or bill seen repeating in the history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringCharge {
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub last_paid: NaiveDateTime,
    pub next_due: NaiveDateTime,
    pub days_until_due: i64,
    pub status: BillStatus,
    pub confidence: f64,
    pub source: ChargeSource,
}

impl RecurringCharge {
    fn new(
        name: String,
        amount: f64,
        frequency: Frequency,
        last_paid: NaiveDateTime,
        confidence: f64,
        source: ChargeSource,
        as_of: NaiveDateTime,
    ) -> Self {
        let next_due = last_paid
            .checked_add_signed(Duration::days(frequency.interval_days()))
            .unwrap_or(NaiveDateTime::MAX);
        let days = days_until(as_of, next_due);
        Self {
            name,
            amount,
            frequency,
            last_paid,
            next_due,
            days_until_due: days,
            status: BillStatus::from_days_until(days),
            confidence,
            source,
        }
    }
}

/// Whether an upcoming bill comes from a detected charge or a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillKind {
    Subscription,
    Predicted,
}

/// A bill expected inside the look-ahead window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingBill {
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDateTime,
    pub kind: BillKind,
    pub confidence: f64,
    pub category: String,
    /// What a forecast was based on (e.g. "3 months of data")
    pub basis: Option<String>,
}

/// Detection thresholds
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Max distance from a catalog price for a match (dollars, exclusive)
    pub catalog_tolerance: f64,
    pub catalog_confidence: f64,
    /// Minimum dated occurrences for a pattern
    pub min_occurrences: usize,
    /// Max relative distance of any amount from the group mean (exclusive)
    pub amount_variance: f64,
    pub detected_confidence: f64,
    /// Months of data needed before a category bill is forecast
    pub forecast_min_months: usize,
    pub forecast_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            catalog_tolerance: 5.0,
            catalog_confidence: 0.9,
            min_occurrences: 3,
            amount_variance: 0.10,
            detected_confidence: 0.7,
            forecast_min_months: 2,
            forecast_confidence: 0.6,
        }
    }
}

/// Finds recurring charges and upcoming bills
#[derive(Debug, Clone)]
pub struct RecurrenceDetector {
    catalog: Vec<KnownService>,
    config: DetectionConfig,
}

impl Default for RecurrenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RecurrenceDetector {
    pub fn new() -> Self {
        Self::with_catalog(default_catalog())
    }

    pub fn with_catalog(catalog: Vec<KnownService>) -> Self {
        Self {
            catalog,
            config: DetectionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DetectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &[KnownService] {
        &self.catalog
    }

    /// Catalog matches first, then patterns among the remaining charges.
    /// Sorted by next due date.
    pub fn detect(&self, expenses: &[&Transaction], as_of: NaiveDateTime) -> Vec<RecurringCharge> {
        let mut consumed: HashSet<usize> = HashSet::new();
        let mut charges = self.match_catalog(expenses, as_of, &mut consumed);
        let catalog_count = charges.len();

        charges.extend(self.detect_patterns(expenses, as_of, &consumed));

        debug!(
            catalog = catalog_count,
            detected = charges.len() - catalog_count,
            "Recurring charge detection complete"
        );

        charges.sort_by(|a, b| a.next_due.cmp(&b.next_due).then_with(|| a.name.cmp(&b.name)));
        charges
    }

    fn match_catalog(
        &self,
        expenses: &[&Transaction],
        as_of: NaiveDateTime,
        consumed: &mut HashSet<usize>,
    ) -> Vec<RecurringCharge> {
        let mut charges = Vec::new();
        let mut seen_names: HashSet<&str> = HashSet::new();

        for service in &self.catalog {
            if !seen_names.insert(service.name.as_str()) {
                continue;
            }

            let mut latest: Option<(NaiveDateTime, f64)> = None;
            for (idx, tx) in expenses.iter().enumerate() {
                if consumed.contains(&idx) || !service.matches(tx, self.config.catalog_tolerance) {
                    continue;
                }
                consumed.insert(idx);
                if let Some(date) = tx.date {
                    if latest.map(|(d, _)| date > d).unwrap_or(true) {
                        latest = Some((date, tx.amount));
                    }
                }
            }

            if let Some((last_paid, amount)) = latest {
                charges.push(RecurringCharge::new(
                    service.name.clone(),
                    amount,
                    service.frequency,
                    last_paid,
                    self.config.catalog_confidence,
                    ChargeSource::Catalog,
                    as_of,
                ));
            }
        }

        charges
    }

    fn detect_patterns(
        &self,
        expenses: &[&Transaction],
        as_of: NaiveDateTime,
        consumed: &HashSet<usize>,
    ) -> Vec<RecurringCharge> {
        let mut groups: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
        for (idx, tx) in expenses.iter().enumerate() {
            if consumed.contains(&idx) || tx.date.is_none() {
                continue;
            }
            let key = normalize_description(&tx.match_text());
            if key.is_empty() {
                continue;
            }
            groups.entry(key).or_default().push(tx);
        }

        groups
            .into_iter()
            .filter_map(|(key, group)| self.detect_group(&key, group, as_of))
            .collect()
    }

    fn detect_group(
        &self,
        key: &str,
        mut group: Vec<&Transaction>,
        as_of: NaiveDateTime,
    ) -> Option<RecurringCharge> {
        if group.len() < self.config.min_occurrences {
            return None;
        }

        let amounts: Vec<f64> = group.iter().map(|t| t.amount).collect();
        let mean_amount = stats::mean(&amounts);
        if mean_amount <= 0.0 {
            return None;
        }
        let amounts_consistent = amounts
            .iter()
            .all(|a| (a - mean_amount).abs() / mean_amount < self.config.amount_variance);
        if !amounts_consistent {
            return None;
        }

        group.sort_by_key(|t| t.date);
        let dates: Vec<NaiveDateTime> = group.iter().filter_map(|t| t.date).collect();
        let intervals: Vec<f64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days() as f64)
            .collect();
        let frequency = frequency_from_interval(stats::mean(&intervals))?;

        let first = group.first()?;
        let last_paid = *dates.last()?;
        let name = first
            .description_text()
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string());

        Some(RecurringCharge::new(
            name,
            mean_amount,
            frequency,
            last_paid,
            self.config.detected_confidence,
            ChargeSource::Detected,
            as_of,
        ))
    }

    /// Bills due between `as_of` and `as_of + window_days`, soonest first
    ///
    /// A window reaching past the calendar's range has no upper bound.
    pub fn upcoming_bills(
        &self,
        charges: &[RecurringCharge],
        expenses: &[&Transaction],
        as_of: NaiveDateTime,
        window_days: i64,
    ) -> Vec<UpcomingBill> {
        let horizon = Duration::try_days(window_days)
            .and_then(|d| as_of.checked_add_signed(d))
            .unwrap_or(NaiveDateTime::MAX);
        let mut bills: Vec<UpcomingBill> = charges
            .iter()
            .filter(|c| c.next_due >= as_of && c.next_due <= horizon)
            .map(|c| UpcomingBill {
                name: c.name.clone(),
                amount: c.amount,
                due_date: c.next_due,
                kind: BillKind::Subscription,
                confidence: c.confidence,
                category: categorize_bill(&c.name).to_string(),
                basis: None,
            })
            .collect();

        if let Some(due) = first_of_next_month(as_of).filter(|d| *d <= horizon) {
            for (category, months) in stats::monthly_category_totals(expenses) {
                if months.len() < self.config.forecast_min_months {
                    continue;
                }
                let totals: Vec<f64> = months.values().copied().collect();
                bills.push(UpcomingBill {
                    name: format!("{} Bill", category),
                    amount: stats::mean(&totals).round(),
                    due_date: due,
                    kind: BillKind::Predicted,
                    confidence: self.config.forecast_confidence,
                    category,
                    basis: Some(format!("{} months of data", months.len())),
                });
            }
        }

        bills.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
        bills
    }
}

/// Lowercase letters only, single-spaced
pub fn normalize_description(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn frequency_from_interval(avg_days: f64) -> Option<Frequency> {
    if (6.0..=8.0).contains(&avg_days) {
        Some(Frequency::Weekly)
    } else if (25.0..=35.0).contains(&avg_days) {
        Some(Frequency::Monthly)
    } else if (350.0..=380.0).contains(&avg_days) {
        Some(Frequency::Yearly)
    } else {
        None
    }
}

/// Bill category from a charge name
pub fn categorize_bill(name: &str) -> &'static str {
    let n = name.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| n.contains(w));

    if any(&["rent", "mortgage"]) {
        "housing"
    } else if any(&["electric", "water", "gas"]) {
        "utilities"
    } else if any(&["insurance"]) {
        "insurance"
    } else if any(&["phone", "internet"]) {
        "utilities"
    } else if any(&["netflix", "spotify", "amazon"]) {
        "entertainment"
    } else {
        "other"
    }
}

fn first_of_next_month(as_of: NaiveDateTime) -> Option<NaiveDateTime> {
    let (year, month) = next_month(month_key(as_of));
    NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, expense, purchase};

    #[test]
    fn test_netflix_round_trip() {
        let txs = vec![
            purchase(15.99, "NETFLIX.COM 866-579", at(2026, 7, 10, 9)),
            purchase(15.99, "NETFLIX.COM 866-579", at(2026, 8, 9, 9)),
            purchase(15.99, "NETFLIX.COM 866-579", at(2026, 9, 8, 9)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();
        let as_of = at(2026, 9, 20, 12);

        let charges = RecurrenceDetector::new().detect(&refs, as_of);
        assert_eq!(charges.len(), 1);
        let netflix = &charges[0];
        assert_eq!(netflix.name, "Netflix");
        assert_eq!(netflix.frequency, Frequency::Monthly);
        assert_eq!(netflix.confidence, 0.9);
        assert_eq!(netflix.source, ChargeSource::Catalog);
        assert_eq!(netflix.last_paid, at(2026, 9, 8, 9));
        assert_eq!(netflix.next_due, at(2026, 10, 8, 9));
        assert_eq!(netflix.status, BillStatus::Active);
    }

    #[test]
    fn test_catalog_requires_price_match() {
        let txs = vec![purchase(45.0, "Netflix gift card", at(2026, 9, 1, 9))];
        let refs: Vec<&Transaction> = txs.iter().collect();
        let charges = RecurrenceDetector::new().detect(&refs, at(2026, 9, 5, 9));
        assert!(charges.is_empty());
    }

    #[test]
    fn test_custom_catalog() {
        let detector = RecurrenceDetector::with_catalog(vec![KnownService::new(
            "Cloud Storage",
            &["dropbox"],
            11.99,
            Frequency::Monthly,
        )]);
        let txs = vec![purchase(11.99, "DROPBOX*PLUS", at(2026, 9, 14, 9))];
        let refs: Vec<&Transaction> = txs.iter().collect();

        let charges = detector.detect(&refs, at(2026, 10, 12, 9));
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].name, "Cloud Storage");
        assert_eq!(charges[0].status, BillStatus::DueSoon);
    }

    #[test]
    fn test_detects_weekly_pattern() {
        let txs = vec![
            purchase(20.0, "Farmers Market #12", at(2026, 9, 5, 10)),
            purchase(21.0, "Farmers Market #7", at(2026, 9, 12, 10)),
            purchase(19.5, "Farmers Market #12", at(2026, 9, 19, 10)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();

        let charges = RecurrenceDetector::new().detect(&refs, at(2026, 9, 20, 10));
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].name, "Farmers Market #12");
        assert_eq!(charges[0].frequency, Frequency::Weekly);
        assert_eq!(charges[0].confidence, 0.7);
        assert_eq!(charges[0].next_due, at(2026, 9, 26, 10));
        assert_eq!(charges[0].status, BillStatus::Upcoming);
    }

    #[test]
    fn test_rejects_irregular_groups() {
        // Amounts vary too much
        let varied = vec![
            purchase(10.0, "Corner Deli", at(2026, 6, 1, 12)),
            purchase(30.0, "Corner Deli", at(2026, 7, 1, 12)),
            purchase(12.0, "Corner Deli", at(2026, 8, 1, 12)),
        ];
        // Spacing matches no frequency
        let spaced = vec![
            purchase(50.0, "Hardware Store", at(2026, 1, 1, 12)),
            purchase(50.0, "Hardware Store", at(2026, 3, 15, 12)),
            purchase(50.0, "Hardware Store", at(2026, 6, 1, 12)),
        ];
        // Too few occurrences
        let short = vec![
            purchase(9.0, "Car Wash", at(2026, 8, 1, 12)),
            purchase(9.0, "Car Wash", at(2026, 8, 31, 12)),
        ];

        let detector = RecurrenceDetector::new();
        for txs in [varied, spaced, short] {
            let refs: Vec<&Transaction> = txs.iter().collect();
            assert!(detector.detect(&refs, at(2026, 9, 1, 12)).is_empty());
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let txs = vec![
            purchase(9.0, "Car Wash", at(2026, 8, 1, 12)),
            purchase(9.0, "Car Wash", at(2026, 8, 31, 12)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();
        let as_of = at(2026, 9, 1, 12);

        assert!(RecurrenceDetector::new().detect(&refs, as_of).is_empty());

        let lenient = RecurrenceDetector::new().with_config(DetectionConfig {
            min_occurrences: 2,
            detected_confidence: 0.5,
            ..Default::default()
        });
        let charges = lenient.detect(&refs, as_of);
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].frequency, Frequency::Monthly);
        assert_eq!(charges[0].confidence, 0.5);
        assert_eq!(charges[0].source, ChargeSource::Detected);
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("NETFLIX.COM 866-579"), "netflix com");
        assert_eq!(normalize_description("  Corner   Deli #4 "), "corner deli");
        assert_eq!(normalize_description("1234 #"), "");
    }

    #[test]
    fn test_categorize_bill() {
        assert_eq!(categorize_bill("Monthly Rent"), "housing");
        assert_eq!(categorize_bill("City Water"), "utilities");
        assert_eq!(categorize_bill("Car Insurance"), "insurance");
        assert_eq!(categorize_bill("Phone Bill"), "utilities");
        assert_eq!(categorize_bill("Netflix"), "entertainment");
        assert_eq!(categorize_bill("Gym Membership"), "other");
    }

    #[test]
    fn test_upcoming_bills() {
        let txs = vec![
            purchase(15.99, "Netflix", at(2026, 9, 8, 9)),
            expense(300.0, "food", at(2026, 8, 3, 12)),
            expense(500.0, "food", at(2026, 9, 3, 12)),
            expense(40.0, "travel", at(2026, 9, 4, 12)),
        ];
        let refs: Vec<&Transaction> = txs.iter().collect();
        let as_of = at(2026, 9, 20, 12);

        let detector = RecurrenceDetector::new();
        let charges = detector.detect(&refs, as_of);
        let bills = detector.upcoming_bills(&charges, &refs, as_of, 30);

        assert_eq!(bills.len(), 2);
        assert_eq!(bills[0].name, "food Bill");
        assert_eq!(bills[0].kind, BillKind::Predicted);
        assert_eq!(bills[0].amount, 400.0);
        assert_eq!(bills[0].due_date, at(2026, 10, 1, 0));
        assert_eq!(bills[0].basis.as_deref(), Some("2 months of data"));
        assert_eq!(bills[1].name, "Netflix");
        assert_eq!(bills[1].kind, BillKind::Subscription);
        assert_eq!(bills[1].category, "entertainment");

        // A narrow window drops both
        assert!(detector.upcoming_bills(&charges, &refs, as_of, 5).is_empty());

        // Windows past the end of the calendar keep everything
        assert_eq!(detector.upcoming_bills(&charges, &refs, as_of, i64::MAX).len(), 2);
        assert_eq!(detector.upcoming_bills(&charges, &refs, as_of, 100_000_000).len(), 2);
    }
}
