//! Gamification - achievements, challenges, levels and streaks
//!
//! Achievements and challenges live in plain-data registries. The built-in
//! ones can be replaced wholesale (from config or in tests) by handing other
//! lists to [`GamificationEngine::with_registry`].
//!
//! Nothing here mutates user state. Unlocks come back as an
//! [`AchievementDelta`] and started challenges as an [`ActiveChallenge`]
//! for the caller to store.
//!
//! [`ActiveChallenge`]: crate::models::ActiveChallenge

pub mod achievements;
pub mod challenges;
pub mod progress;

use serde::{Deserialize, Serialize};

use crate::models::UserStatSnapshot;

pub use achievements::{default_achievements, Achievement, AchievementDelta};
pub use challenges::{
    default_challenges, Challenge, ChallengeGoal, ChallengeProgress, ChallengeState,
};
pub use progress::{calculate_level, calculate_streak, daily_goals, DailyGoals, LevelInfo};

/// A number read off the stat snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatMetric {
    ExpenseCount,
    SavingsRate,
    Streak,
    BudgetStreak,
    CategoryCount,
    EarlyLogCount,
    NoImpulseDays,
    TotalPoints,
    /// 1 when any coffee purchase is in the history, else 0
    CoffeePurchases,
    NoCoffeeDays,
    GroceryReduction,
    WeekendSpending,
    NoOnlineShoppingDays,
}

impl StatMetric {
    pub fn value(&self, snapshot: &UserStatSnapshot) -> f64 {
        match self {
            Self::ExpenseCount => snapshot.expense_count as f64,
            Self::SavingsRate => snapshot.savings_rate,
            Self::Streak => f64::from(snapshot.streak),
            Self::BudgetStreak => f64::from(snapshot.budget_streak),
            Self::CategoryCount => snapshot.category_count as f64,
            Self::EarlyLogCount => snapshot.early_log_count as f64,
            Self::NoImpulseDays => f64::from(snapshot.no_impulse_days),
            Self::TotalPoints => snapshot.total_points as f64,
            Self::CoffeePurchases => {
                if snapshot.coffee_purchases {
                    1.0
                } else {
                    0.0
                }
            }
            Self::NoCoffeeDays => f64::from(snapshot.no_coffee_days),
            Self::GroceryReduction => snapshot.grocery_reduction,
            Self::WeekendSpending => snapshot.weekend_spending,
            Self::NoOnlineShoppingDays => f64::from(snapshot.no_online_shopping_days),
        }
    }
}

/// Evaluates the achievement and challenge registries against a snapshot
#[derive(Debug, Clone)]
pub struct GamificationEngine {
    achievements: Vec<Achievement>,
    challenges: Vec<Challenge>,
}

impl Default for GamificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GamificationEngine {
    /// Engine with the built-in registries
    pub fn new() -> Self {
        Self::with_registry(default_achievements(), default_challenges())
    }

    pub fn with_registry(achievements: Vec<Achievement>, challenges: Vec<Challenge>) -> Self {
        Self {
            achievements,
            challenges,
        }
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn challenge(&self, id: &str) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.id == id)
    }
}
