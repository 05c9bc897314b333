//! Achievement registry and unlock checks

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GamificationEngine, StatMetric};
use crate::models::{UserProfile, UserStatSnapshot};

/// Unlocked once `metric >= threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub points: u64,
    pub metric: StatMetric,
    pub threshold: f64,
}

impl Achievement {
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        points: u64,
        metric: StatMetric,
        threshold: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            points,
            metric,
            threshold,
        }
    }

    pub fn is_met(&self, snapshot: &UserStatSnapshot) -> bool {
        self.metric.value(snapshot) >= self.threshold
    }
}

pub fn default_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new(
            "first_expense",
            "First Step",
            "Added your first expense",
            10,
            StatMetric::ExpenseCount,
            1.0,
        ),
        Achievement::new(
            "savings_master",
            "Savings Master",
            "Achieved 20% savings rate",
            50,
            StatMetric::SavingsRate,
            20.0,
        ),
        Achievement::new(
            "streak_7",
            "Week Warrior",
            "7-day tracking streak",
            25,
            StatMetric::Streak,
            7.0,
        ),
        Achievement::new(
            "streak_30",
            "Monthly Master",
            "30-day tracking streak",
            100,
            StatMetric::Streak,
            30.0,
        ),
        Achievement::new(
            "budget_keeper",
            "Budget Keeper",
            "Stayed under budget for 3 months",
            75,
            StatMetric::BudgetStreak,
            3.0,
        ),
        Achievement::new(
            "category_explorer",
            "Category Explorer",
            "Used 8 different expense categories",
            30,
            StatMetric::CategoryCount,
            8.0,
        ),
        Achievement::new(
            "early_bird",
            "Early Bird",
            "Logged expenses before 9 AM",
            15,
            StatMetric::EarlyLogCount,
            5.0,
        ),
        Achievement::new(
            "no_impulse",
            "Impulse Controller",
            "No impulse purchases for 2 weeks",
            40,
            StatMetric::NoImpulseDays,
            14.0,
        ),
    ]
}

/// Newly unlocked achievements and the points they are worth
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementDelta {
    pub unlocked: Vec<Achievement>,
    pub points_earned: u64,
}

impl AchievementDelta {
    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    /// A copy of `profile` with this delta applied
    pub fn applied_to(&self, profile: &UserProfile) -> UserProfile {
        let mut updated = profile.clone();
        for achievement in &self.unlocked {
            if !updated.unlocked_achievements.contains(&achievement.id) {
                updated.unlocked_achievements.push(achievement.id.clone());
            }
        }
        updated.total_points += self.points_earned;
        updated
    }
}

impl GamificationEngine {
    /// Achievements whose condition holds and that aren't unlocked yet
    pub fn check_achievements(&self, snapshot: &UserStatSnapshot) -> AchievementDelta {
        let unlocked: Vec<Achievement> = self
            .achievements
            .iter()
            .filter(|a| !snapshot.unlocked_achievement_ids.contains(&a.id) && a.is_met(snapshot))
            .cloned()
            .collect();

        let points_earned = unlocked.iter().map(|a| a.points).sum();
        debug!(
            unlocked = unlocked.len(),
            points = points_earned,
            "Achievement check complete"
        );

        AchievementDelta {
            unlocked,
            points_earned,
        }
    }
}
