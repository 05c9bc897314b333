//! Domain models for Spendwise

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::import::{parse_amount, parse_datetime};

/// Category assigned when nothing better is known
pub const OTHER_CATEGORY: &str = "other";

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" | "deposit" => Ok(Self::Income),
            "expense" | "debit" | "sale" | "payment" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income or expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: String,
    /// Always positive for records that count; anything else is skipped.
    /// Numeric strings are accepted and unreadable values become `0.0`.
    #[serde(default, deserialize_with = "deserialize_lenient_amount")]
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Unparsable or missing dates are kept as `None` and left out of
    /// anything bucketed by time
    #[serde(default, deserialize_with = "deserialize_lenient_datetime")]
    pub date: Option<NaiveDateTime>,
    /// Accepts the same aliases as CSV input; unknown values mean expense
    #[serde(default, deserialize_with = "deserialize_lenient_kind")]
    pub kind: TransactionKind,
}

impl Transaction {
    /// Whether this record takes part in aggregations
    pub fn is_counted(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense && self.is_counted()
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income && self.is_counted()
    }

    /// Category with the "other" default applied
    pub fn category_or_other(&self) -> &str {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(OTHER_CATEGORY)
    }

    /// Non-empty description, if any
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Lowercased text used for merchant matching (description, else category)
    pub fn match_text(&self) -> String {
        self.description_text()
            .or(self.category.as_deref())
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Weekend purchases and anything between 22:00 and 06:00
    pub fn is_impulse_time(&self) -> bool {
        match self.date {
            Some(date) => {
                matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
                    || date.hour() >= 22
                    || date.hour() < 6
            }
            None => false,
        }
    }

    pub fn is_weekend(&self) -> bool {
        self.date
            .map(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .unwrap_or(false)
    }
}

fn deserialize_lenient_datetime<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => parse_datetime(&raw),
        _ => None,
    })
}

fn deserialize_lenient_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(raw) => parse_amount(&raw).unwrap_or(0.0),
        _ => 0.0,
    })
}

fn deserialize_lenient_kind<'de, D>(
    deserializer: D,
) -> std::result::Result<TransactionKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => raw.parse().unwrap_or_default(),
        _ => TransactionKind::default(),
    })
}

/// Counted expenses, in input order
pub fn expenses(transactions: &[Transaction]) -> Vec<&Transaction> {
    transactions.iter().filter(|t| t.is_expense()).collect()
}

/// Counted income records, in input order
pub fn incomes(transactions: &[Transaction]) -> Vec<&Transaction> {
    transactions.iter().filter(|t| t.is_income()).collect()
}

/// Billing frequency of a recurring charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Days between two charges
    pub fn interval_days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Monthly => 30,
            Self::Yearly => 365,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a recurring charge is relative to its next due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Overdue,
    DueSoon,
    Upcoming,
    Active,
}

impl BillStatus {
    pub fn from_days_until(days: i64) -> Self {
        if days < 0 {
            Self::Overdue
        } else if days <= 3 {
            Self::DueSoon
        } else if days <= 7 {
            Self::Upcoming
        } else {
            Self::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::DueSoon => "due_soon",
            Self::Upcoming => "upcoming",
            Self::Active => "active",
        }
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whole days from `from` until `to`, rounded up
pub fn days_until(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let seconds = (to - from).num_seconds();
    seconds.div_euclid(86_400) + i64::from(seconds.rem_euclid(86_400) != 0)
}

/// Display priority shared by notifications and advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Numeric rank for sorting (higher = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the user says they feel today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Stressed,
    Happy,
    Tired,
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stressed" => Ok(Self::Stressed),
            "happy" => Ok(Self::Happy),
            "tired" => Ok(Self::Tired),
            _ => Err(format!("Unknown mood: {}", s)),
        }
    }
}

/// A challenge the user has started, as stored by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveChallenge {
    pub id: String,
    pub start_date: NaiveDateTime,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: f64,
}

/// Everything the caller knows about the user between refreshes
///
/// The engine only reads this. Applying achievement deltas or newly started
/// challenges is up to whoever stores it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: Option<String>,
    /// Overrides the income summed from transactions
    pub monthly_income: Option<f64>,
    /// Defaults to income when absent
    pub monthly_budget: Option<f64>,
    pub savings_balance: f64,
    /// Target savings rate in percent (defaults to 20)
    pub savings_goal_percent: Option<f64>,
    pub current_streak: u32,
    pub budget_streak: u32,
    pub no_impulse_days: u32,
    pub total_points: u64,
    pub unlocked_achievements: Vec<String>,
    #[serde(deserialize_with = "deserialize_lenient_datetime")]
    pub last_activity: Option<NaiveDateTime>,
    pub no_coffee_days: u32,
    /// Percent reduction in grocery spend vs the previous period
    pub grocery_reduction: f64,
    pub no_online_shopping_days: u32,
    pub active_challenges: Vec<ActiveChallenge>,
    pub mood: Option<Mood>,
}

/// Read-only view of the user's stats for one analysis cycle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStatSnapshot {
    pub expense_count: usize,
    pub savings_rate: f64,
    pub streak: u32,
    pub budget_streak: u32,
    pub category_count: usize,
    pub early_log_count: usize,
    pub no_impulse_days: u32,
    pub total_points: u64,
    pub unlocked_achievement_ids: BTreeSet<String>,
    pub last_activity: Option<NaiveDateTime>,
    pub coffee_purchases: bool,
    pub no_coffee_days: u32,
    pub grocery_reduction: f64,
    pub weekend_spending: f64,
    pub no_online_shopping_days: u32,
    pub active_challenges: Vec<ActiveChallenge>,
}

impl UserStatSnapshot {
    /// Combine the stored profile with what the current expenses show
    pub fn from_activity(
        profile: &UserProfile,
        expenses: &[&Transaction],
        savings_rate: f64,
    ) -> Self {
        let categories: HashSet<&str> = expenses.iter().map(|t| t.category_or_other()).collect();

        let early_log_count = expenses
            .iter()
            .filter(|t| t.date.map(|d| d.hour() < 9).unwrap_or(false))
            .count();

        let coffee_purchases = expenses
            .iter()
            .any(|t| t.match_text().contains("coffee"));

        let weekend_spending = expenses
            .iter()
            .filter(|t| t.is_weekend())
            .map(|t| t.amount)
            .sum();

        Self {
            expense_count: expenses.len(),
            savings_rate,
            streak: profile.current_streak,
            budget_streak: profile.budget_streak,
            category_count: categories.len(),
            early_log_count,
            no_impulse_days: profile.no_impulse_days,
            total_points: profile.total_points,
            unlocked_achievement_ids: profile.unlocked_achievements.iter().cloned().collect(),
            last_activity: profile.last_activity,
            coffee_purchases,
            no_coffee_days: profile.no_coffee_days,
            grocery_reduction: profile.grocery_reduction,
            weekend_spending,
            no_online_shopping_days: profile.no_online_shopping_days,
            active_challenges: profile.active_challenges.clone(),
        }
    }
}
