//! Time-boxed challenges
//!
//! A challenge moves from not started to active once the user starts it, and
//! from active to completed or expired. Expiry is never stored; it is what a
//! started, unfinished challenge becomes once `as_of` leaves its window.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{GamificationEngine, StatMetric};
use crate::models::{ActiveChallenge, UserStatSnapshot};

/// How progress and completion are measured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ChallengeGoal {
    /// Climb to `target`
    Reach { metric: StatMetric, target: f64 },
    /// Keep `metric` below `limit`; progress shrinks as it grows
    StayUnder { metric: StatMetric, limit: f64 },
    /// Count abstinent days toward `target_days`; done while `purchases` is 0
    Abstain {
        days: StatMetric,
        target_days: f64,
        purchases: StatMetric,
    },
}

impl ChallengeGoal {
    /// Progress in percent, clamped to [0, 100]
    pub fn progress(&self, snapshot: &UserStatSnapshot) -> f64 {
        let raw = match self {
            Self::Reach { metric, target } => ratio(metric.value(snapshot), *target) * 100.0,
            Self::StayUnder { metric, limit } => {
                100.0 - ratio(metric.value(snapshot), *limit) * 100.0
            }
            Self::Abstain {
                days, target_days, ..
            } => ratio(days.value(snapshot), *target_days) * 100.0,
        };
        if raw.is_finite() {
            raw.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn is_completed(&self, snapshot: &UserStatSnapshot) -> bool {
        match self {
            Self::Reach { metric, target } => metric.value(snapshot) >= *target,
            Self::StayUnder { metric, limit } => metric.value(snapshot) < *limit,
            Self::Abstain { purchases, .. } => purchases.value(snapshot) == 0.0,
        }
    }
}

fn ratio(value: f64, target: f64) -> f64 {
    if target == 0.0 {
        0.0
    } else {
        value / target
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration_days: i64,
    pub reward: u64,
    pub goal: ChallengeGoal,
}

impl Challenge {
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        duration_days: i64,
        reward: u64,
        goal: ChallengeGoal,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            duration_days,
            reward,
            goal,
        }
    }

    /// Whether `as_of` falls in [start, start + duration]
    ///
    /// A window ending past the calendar's range never closes.
    pub fn is_within_window(&self, start: NaiveDateTime, as_of: NaiveDateTime) -> bool {
        let end = Duration::try_days(self.duration_days)
            .and_then(|d| start.checked_add_signed(d))
            .unwrap_or(NaiveDateTime::MAX);
        as_of >= start && as_of <= end
    }
}

pub fn default_challenges() -> Vec<Challenge> {
    vec![
        Challenge::new(
            "no_coffee_week",
            "No Coffee Week",
            "Skip coffee shop purchases for 7 days",
            7,
            50,
            ChallengeGoal::Abstain {
                days: StatMetric::NoCoffeeDays,
                target_days: 7.0,
                purchases: StatMetric::CoffeePurchases,
            },
        ),
        Challenge::new(
            "grocery_saver",
            "Grocery Saver",
            "Reduce grocery spending by 25%",
            30,
            75,
            ChallengeGoal::Reach {
                metric: StatMetric::GroceryReduction,
                target: 25.0,
            },
        ),
        Challenge::new(
            "weekend_saver",
            "Weekend Saver",
            "Spend less than $50 on weekends",
            4,
            30,
            ChallengeGoal::StayUnder {
                metric: StatMetric::WeekendSpending,
                limit: 50.0,
            },
        ),
        Challenge::new(
            "digital_detox",
            "Digital Detox",
            "No online shopping for 2 weeks",
            14,
            60,
            ChallengeGoal::Reach {
                metric: StatMetric::NoOnlineShoppingDays,
                target: 14.0,
            },
        ),
    ]
}

/// Where a challenge stands for the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeState {
    NotStarted,
    Active,
    Completed,
    Expired,
}

impl ChallengeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for ChallengeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeProgress {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward: u64,
    pub duration_days: i64,
    pub progress: f64,
    /// The goal currently holds
    pub completed: bool,
    /// Started, not marked completed, and inside its window
    pub active: bool,
    pub state: ChallengeState,
}

impl GamificationEngine {
    /// Progress for every registered challenge, in registry order
    pub fn challenge_progress(
        &self,
        snapshot: &UserStatSnapshot,
        as_of: NaiveDateTime,
    ) -> Vec<ChallengeProgress> {
        self.challenges
            .iter()
            .map(|challenge| {
                let entry = snapshot
                    .active_challenges
                    .iter()
                    .find(|c| c.id == challenge.id);
                let state = challenge_state(challenge, entry, as_of);

                ChallengeProgress {
                    id: challenge.id.clone(),
                    title: challenge.title.clone(),
                    description: challenge.description.clone(),
                    reward: challenge.reward,
                    duration_days: challenge.duration_days,
                    progress: challenge.goal.progress(snapshot),
                    completed: challenge.goal.is_completed(snapshot),
                    active: state == ChallengeState::Active,
                    state,
                }
            })
            .collect()
    }

    /// A fresh entry for the caller to store; `None` for unknown ids or
    /// challenges already in the list
    pub fn start_challenge(
        &self,
        id: &str,
        snapshot: &UserStatSnapshot,
        as_of: NaiveDateTime,
    ) -> Option<ActiveChallenge> {
        let challenge = self.challenge(id)?;
        if snapshot.active_challenges.iter().any(|c| c.id == challenge.id) {
            return None;
        }

        Some(ActiveChallenge {
            id: challenge.id.clone(),
            start_date: as_of,
            completed: false,
            progress: 0.0,
        })
    }
}

fn challenge_state(
    challenge: &Challenge,
    entry: Option<&ActiveChallenge>,
    as_of: NaiveDateTime,
) -> ChallengeState {
    match entry {
        None => ChallengeState::NotStarted,
        Some(e) if e.completed => ChallengeState::Completed,
        Some(e) if challenge.is_within_window(e.start_date, as_of) => ChallengeState::Active,
        Some(_) => ChallengeState::Expired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::at;

    fn find<'a>(progress: &'a [ChallengeProgress], id: &str) -> &'a ChallengeProgress {
        progress.iter().find(|p| p.id == id).unwrap()
    }

    fn started(id: &str, start: NaiveDateTime, completed: bool) -> ActiveChallenge {
        ActiveChallenge {
            id: id.to_string(),
            start_date: start,
            completed,
            progress: 0.0,
        }
    }

    #[test]
    fn test_progress_values() {
        let snapshot = UserStatSnapshot {
            no_coffee_days: 3,
            coffee_purchases: true,
            grocery_reduction: 40.0,
            weekend_spending: 20.0,
            no_online_shopping_days: 7,
            ..Default::default()
        };
        let progress = GamificationEngine::new().challenge_progress(&snapshot, at(2026, 10, 16, 12));
        assert_eq!(progress.len(), 4);

        let coffee = find(&progress, "no_coffee_week");
        assert!((coffee.progress - 300.0 / 7.0).abs() < 1e-9);
        assert!(!coffee.completed);

        let grocery = find(&progress, "grocery_saver");
        assert_eq!(grocery.progress, 100.0);
        assert!(grocery.completed);

        let weekend = find(&progress, "weekend_saver");
        assert!((weekend.progress - 60.0).abs() < 1e-9);
        assert!(weekend.completed);

        let detox = find(&progress, "digital_detox");
        assert_eq!(detox.progress, 50.0);
        assert!(!detox.completed);
    }

    #[test]
    fn test_progress_is_clamped() {
        let snapshot = UserStatSnapshot {
            grocery_reduction: -10.0,
            weekend_spending: 400.0,
            ..Default::default()
        };
        let progress = GamificationEngine::new().challenge_progress(&snapshot, at(2026, 10, 16, 12));
        for p in &progress {
            assert!((0.0..=100.0).contains(&p.progress), "{} out of range", p.id);
        }
        assert_eq!(find(&progress, "weekend_saver").progress, 0.0);
    }

    #[test]
    fn test_window_past_calendar_range() {
        let challenge = Challenge::new(
            "forever",
            "Forever",
            "Never ends",
            i64::MAX,
            1,
            ChallengeGoal::Reach {
                metric: StatMetric::SavingsRate,
                target: 10.0,
            },
        );
        let start = at(2026, 10, 1, 9);
        assert!(challenge.is_within_window(start, at(2030, 1, 1, 0)));
        assert!(!challenge.is_within_window(start, at(2026, 9, 30, 9)));
    }

    #[test]
    fn test_challenge_states() {
        let as_of = at(2026, 10, 16, 12);
        let snapshot = UserStatSnapshot {
            active_challenges: vec![
                started("no_coffee_week", at(2026, 10, 12, 9), false),
                started("weekend_saver", at(2026, 10, 1, 9), false),
                started("digital_detox", at(2026, 10, 10, 9), true),
            ],
            ..Default::default()
        };

        let progress = GamificationEngine::new().challenge_progress(&snapshot, as_of);
        assert_eq!(find(&progress, "no_coffee_week").state, ChallengeState::Active);
        assert!(find(&progress, "no_coffee_week").active);
        assert_eq!(find(&progress, "weekend_saver").state, ChallengeState::Expired);
        assert!(!find(&progress, "weekend_saver").active);
        assert_eq!(find(&progress, "digital_detox").state, ChallengeState::Completed);
        assert!(!find(&progress, "digital_detox").active);
        assert_eq!(find(&progress, "grocery_saver").state, ChallengeState::NotStarted);
    }

    #[test]
    fn test_window_end_is_inclusive() {
        let challenge = &default_challenges()[0];
        let start = at(2026, 10, 1, 9);
        assert!(challenge.is_within_window(start, at(2026, 10, 8, 9)));
        assert!(!challenge.is_within_window(start, at(2026, 10, 8, 10)));
        assert!(!challenge.is_within_window(start, at(2026, 10, 1, 8)));
    }

    #[test]
    fn test_start_challenge() {
        let engine = GamificationEngine::new();
        let as_of = at(2026, 10, 16, 12);
        let mut snapshot = UserStatSnapshot::default();

        let entry = engine.start_challenge("weekend_saver", &snapshot, as_of).unwrap();
        assert_eq!(entry.start_date, as_of);
        assert!(!entry.completed);
        assert_eq!(entry.progress, 0.0);

        snapshot.active_challenges.push(entry);
        assert!(engine.start_challenge("weekend_saver", &snapshot, as_of).is_none());
        assert!(engine.start_challenge("unknown", &snapshot, as_of).is_none());

        let progress = engine.challenge_progress(&snapshot, as_of);
        assert!(find(&progress, "weekend_saver").active);
    }

    #[test]
    fn test_goal_serde_shape() {
        let goal: ChallengeGoal =
            toml::from_str("rule = \"stay_under\"\nmetric = \"weekend_spending\"\nlimit = 80.0")
                .unwrap();
        assert_eq!(
            goal,
            ChallengeGoal::StayUnder {
                metric: StatMetric::WeekendSpending,
                limit: 80.0
            }
        );
    }
}
