//! Proactive notifications
//!
//! Each rule is gated on its own; none depends on another firing. The engine
//! only builds notifications. Delivering or storing them is the caller's job.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::detect::UpcomingBill;
use crate::models::{days_until, Priority, Transaction};
use crate::stats;

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BillReminder,
    SpendingAlert,
    BudgetWarning,
    SavingsReminder,
    /// Engagement nudges
    Motivation,
    Reminder,
    Achievement,
    Challenge,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BillReminder => "bill_reminder",
            Self::SpendingAlert => "spending_alert",
            Self::BudgetWarning => "budget_warning",
            Self::SavingsReminder => "savings_reminder",
            Self::Motivation => "motivation",
            Self::Reminder => "reminder",
            Self::Achievement => "achievement",
            Self::Challenge => "challenge",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bill_reminder" => Ok(Self::BillReminder),
            "spending_alert" => Ok(Self::SpendingAlert),
            "budget_warning" => Ok(Self::BudgetWarning),
            "savings_reminder" => Ok(Self::SavingsReminder),
            "motivation" => Ok(Self::Motivation),
            "reminder" => Ok(Self::Reminder),
            "achievement" => Ok(Self::Achievement),
            "challenge" => Ok(Self::Challenge),
            _ => Err(format!("Unknown notification kind: {}", s)),
        }
    }
}

/// A message for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    /// Hint for a button or follow-up (e.g. "Review budget")
    pub action: Option<String>,
    /// Rule-specific structured data
    pub data: serde_json::Value,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        priority: Priority,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            priority,
            title: title.into(),
            message: message.into(),
            action: None,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// Most urgent first; equal priorities keep their order
pub fn sort_by_priority(notifications: &mut [Notification]) {
    notifications.sort_by_key(|n| std::cmp::Reverse(n.priority.rank()));
}

/// Notification thresholds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationConfig {
    /// Bills further out than this are never reminded about
    pub reminder_window_days: i64,
    pub due_soon_days: i64,
    /// Today's spend over this multiple of the daily average raises an alert
    pub spending_alert_ratio: f64,
    /// Fraction of the monthly budget that triggers a warning
    pub budget_warning_ratio: f64,
    /// Savings rate (percent) below which a reminder is sent
    pub savings_reminder_rate: f64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            reminder_window_days: 7,
            due_soon_days: 3,
            spending_alert_ratio: 1.5,
            budget_warning_ratio: 0.8,
            savings_reminder_rate: 15.0,
        }
    }
}

/// What the rules look at in one cycle
pub struct NotificationInput<'a> {
    pub bills: &'a [UpcomingBill],
    pub expenses: &'a [&'a Transaction],
    pub monthly_budget: f64,
    pub savings_rate: f64,
    pub as_of: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationEngine {
    config: NotificationConfig,
}

impl NotificationEngine {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Run every rule, in rule order
    pub fn generate(&self, input: &NotificationInput<'_>) -> Vec<Notification> {
        let mut notifications = self.bill_reminders(input);
        notifications.extend(self.spending_alert(input));
        notifications.extend(self.budget_warning(input));
        notifications.extend(self.savings_reminder(input));
        notifications
    }

    fn bill_reminders(&self, input: &NotificationInput<'_>) -> Vec<Notification> {
        input
            .bills
            .iter()
            .filter_map(|bill| {
                let days = days_until(input.as_of, bill.due_date);
                if days < 0 || days > self.config.reminder_window_days {
                    return None;
                }
                if days > self.config.due_soon_days {
                    return None;
                }
                let plural = if days == 1 { "" } else { "s" };
                Some(
                    Notification::new(
                        NotificationKind::BillReminder,
                        Priority::High,
                        "Bill Due Soon",
                        format!(
                            "{} (${:.2}) is due in {} day{}",
                            bill.name, bill.amount, days, plural
                        ),
                    )
                    .with_action("Mark as paid")
                    .with_data(json!({
                        "bill": bill.name,
                        "amount": bill.amount,
                        "due_date": bill.due_date,
                        "days_until_due": days,
                    })),
                )
            })
            .collect()
    }

    fn spending_alert(&self, input: &NotificationInput<'_>) -> Option<Notification> {
        let today = input.as_of.date();
        let spent_today: f64 = input
            .expenses
            .iter()
            .filter(|t| t.date.map(|d| d.date() == today).unwrap_or(false))
            .map(|t| t.amount)
            .sum();

        let avg_daily = stats::average_daily_spending(input.expenses);
        if avg_daily <= 0.0 || spent_today <= avg_daily * self.config.spending_alert_ratio {
            return None;
        }

        let percent = (spent_today / avg_daily * 100.0).round();
        Some(
            Notification::new(
                NotificationKind::SpendingAlert,
                Priority::Medium,
                "High Spending Today",
                format!(
                    "You've spent ${:.2} today, which is {}% of your average daily spending.",
                    spent_today, percent
                ),
            )
            .with_action("Review today's expenses")
            .with_data(json!({
                "spent_today": spent_today,
                "average_daily": avg_daily,
            })),
        )
    }

    fn budget_warning(&self, input: &NotificationInput<'_>) -> Option<Notification> {
        if !input.monthly_budget.is_finite() || input.monthly_budget <= 0.0 {
            return None;
        }

        let (year, month) = (input.as_of.year(), input.as_of.month());
        let month_to_date: f64 = input
            .expenses
            .iter()
            .filter(|t| {
                t.date
                    .map(|d| d.year() == year && d.month() == month && d <= input.as_of)
                    .unwrap_or(false)
            })
            .map(|t| t.amount)
            .sum();

        let used = month_to_date / input.monthly_budget;
        if used < self.config.budget_warning_ratio {
            return None;
        }

        Some(
            Notification::new(
                NotificationKind::BudgetWarning,
                Priority::High,
                "Budget Warning",
                format!("You've used {:.1}% of your monthly budget.", used * 100.0),
            )
            .with_action("Review budget")
            .with_data(json!({
                "spent": month_to_date,
                "budget": input.monthly_budget,
            })),
        )
    }

    fn savings_reminder(&self, input: &NotificationInput<'_>) -> Option<Notification> {
        if input.savings_rate >= self.config.savings_reminder_rate {
            return None;
        }

        Some(
            Notification::new(
                NotificationKind::SavingsReminder,
                Priority::Low,
                "Savings Opportunity",
                format!(
                    "Your current savings rate is {:.1}%. Consider increasing it to 20% for better financial health.",
                    input.savings_rate
                ),
            )
            .with_action("Set savings goal")
            .with_data(json!({ "savings_rate": input.savings_rate })),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BillKind;
    use crate::test_utils::{at, expense};

    fn bill(name: &str, due: NaiveDateTime) -> UpcomingBill {
        UpcomingBill {
            name: name.to_string(),
            amount: 15.99,
            due_date: due,
            kind: BillKind::Subscription,
            confidence: 0.9,
            category: "entertainment".to_string(),
            basis: None,
        }
    }

    fn kinds(notifications: &[Notification]) -> Vec<NotificationKind> {
        notifications.iter().map(|n| n.kind).collect()
    }

    #[test]
    fn test_bill_reminder_window() {
        let as_of = at(2026, 10, 16, 12);
        let bills = vec![
            bill("Netflix", at(2026, 10, 17, 12)),
            bill("Spotify", at(2026, 10, 22, 12)),
            bill("Late", at(2026, 10, 15, 12)),
        ];
        let input = NotificationInput {
            bills: &bills,
            expenses: &[],
            monthly_budget: 0.0,
            savings_rate: 50.0,
            as_of,
        };

        let notifications = NotificationEngine::default().generate(&input);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::BillReminder);
        assert_eq!(notifications[0].priority, Priority::High);
        assert_eq!(notifications[0].message, "Netflix ($15.99) is due in 1 day");
        assert_eq!(notifications[0].data["days_until_due"], 1);
    }

    #[test]
    fn test_bill_reminder_boundary() {
        let as_of = at(2026, 10, 16, 12);
        let bills = vec![
            bill("Exactly three", at(2026, 10, 19, 12)),
            bill("Just under three", at(2026, 10, 19, 11)),
            bill("Just over three", at(2026, 10, 19, 13)),
            bill("Exactly four", at(2026, 10, 20, 12)),
        ];
        let input = NotificationInput {
            bills: &bills,
            expenses: &[],
            monthly_budget: 0.0,
            savings_rate: 50.0,
            as_of,
        };

        let notifications = NotificationEngine::default().generate(&input);
        let mut reminded: Vec<&str> = notifications
            .iter()
            .filter(|n| n.kind == NotificationKind::BillReminder)
            .filter_map(|n| n.data["bill"].as_str())
            .collect();
        reminded.sort_unstable();
        assert_eq!(reminded, vec!["Exactly three", "Just under three"]);

        // Partial days round up
        let three = notifications
            .iter()
            .find(|n| n.data["bill"] == "Just under three")
            .unwrap();
        assert_eq!(three.data["days_until_due"], 3);
        assert!(three.message.ends_with("is due in 3 days"));
    }

    #[test]
    fn test_spending_alert() {
        let history = vec![
            expense(10.0, "food", at(2026, 10, 7, 12)),
            expense(10.0, "food", at(2026, 10, 10, 12)),
            expense(40.0, "food", at(2026, 10, 16, 9)),
        ];
        let refs: Vec<&Transaction> = history.iter().collect();
        // 60 over 10 days = 6/day; today is 40
        let input = NotificationInput {
            bills: &[],
            expenses: &refs,
            monthly_budget: 0.0,
            savings_rate: 50.0,
            as_of: at(2026, 10, 16, 20),
        };

        let notifications = NotificationEngine::default().generate(&input);
        assert_eq!(kinds(&notifications), vec![NotificationKind::SpendingAlert]);
        assert!(notifications[0].message.contains("$40.00"));
    }

    #[test]
    fn test_budget_warning_at_threshold() {
        let history = vec![
            expense(400.0, "rent", at(2026, 10, 1, 12)),
            expense(400.0, "rent", at(2026, 10, 2, 12)),
            // Previous month does not count
            expense(900.0, "rent", at(2026, 9, 2, 12)),
        ];
        let refs: Vec<&Transaction> = history.iter().collect();
        let mut input = NotificationInput {
            bills: &[],
            expenses: &refs,
            monthly_budget: 1000.0,
            savings_rate: 50.0,
            as_of: at(2026, 10, 16, 12),
        };

        let engine = NotificationEngine::default();
        let notifications = engine.generate(&input);
        assert_eq!(kinds(&notifications), vec![NotificationKind::BudgetWarning]);
        assert_eq!(notifications[0].message, "You've used 80.0% of your monthly budget.");

        input.monthly_budget = 1001.0;
        assert!(engine.generate(&input).is_empty());

        input.monthly_budget = 0.0;
        assert!(engine.generate(&input).is_empty());
    }

    #[test]
    fn test_savings_reminder() {
        let input = NotificationInput {
            bills: &[],
            expenses: &[],
            monthly_budget: 0.0,
            savings_rate: 12.0,
            as_of: at(2026, 10, 16, 12),
        };
        let notifications = NotificationEngine::default().generate(&input);
        assert_eq!(kinds(&notifications), vec![NotificationKind::SavingsReminder]);
        assert_eq!(notifications[0].priority, Priority::Low);
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let mut notifications = vec![
            Notification::new(NotificationKind::SavingsReminder, Priority::Low, "a", ""),
            Notification::new(NotificationKind::BillReminder, Priority::High, "b", ""),
            Notification::new(NotificationKind::SpendingAlert, Priority::Medium, "c", ""),
            Notification::new(NotificationKind::BudgetWarning, Priority::High, "d", ""),
        ];
        sort_by_priority(&mut notifications);
        let titles: Vec<&str> = notifications.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "d", "c", "a"]);
    }
}
