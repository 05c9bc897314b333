//! Levels, streaks, daily goals and engagement nudges

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::GamificationEngine;
use crate::models::{Priority, UserStatSnapshot};
use crate::notify::{Notification, NotificationKind};

const POINTS_PER_LEVEL: u64 = 100;

/// Levels below this get a level-up nudge
const NUDGE_LEVEL_CEILING: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u64,
    pub total_points: u64,
    pub points_in_level: u64,
    pub points_to_next: u64,
    /// Percent of the way through the current level
    pub progress: f64,
}

pub fn calculate_level(total_points: u64) -> LevelInfo {
    let points_in_level = total_points % POINTS_PER_LEVEL;
    LevelInfo {
        level: total_points / POINTS_PER_LEVEL + 1,
        total_points,
        points_in_level,
        points_to_next: POINTS_PER_LEVEL - points_in_level,
        progress: points_in_level as f64 / POINTS_PER_LEVEL as f64 * 100.0,
    }
}

/// Streak after activity at `as_of`, by calendar days since the last one
///
/// Same day keeps the streak, the next day extends it, a longer gap resets
/// it. No prior activity means no streak.
pub fn calculate_streak(
    current: u32,
    last_activity: Option<NaiveDateTime>,
    as_of: NaiveDateTime,
) -> u32 {
    let Some(last) = last_activity else {
        return 0;
    };

    match (as_of.date() - last.date()).num_days() {
        d if d <= 0 => current,
        1 => current.saturating_add(1),
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyGoals {
    pub max_daily_spending: f64,
    pub target_savings: f64,
    pub streak_goal: u32,
    pub achievement_goal: u32,
}

/// Targets for today from the average daily spend and the savings goal.
/// Missing inputs fall back to $50/day and 20 %.
pub fn daily_goals(avg_daily: f64, savings_goal_percent: Option<f64>, streak: u32) -> DailyGoals {
    let avg = if avg_daily.is_finite() && avg_daily > 0.0 {
        avg_daily
    } else {
        50.0
    };
    let goal = savings_goal_percent
        .filter(|g| g.is_finite() && *g > 0.0)
        .unwrap_or(20.0);

    DailyGoals {
        max_daily_spending: (avg * 0.9).round(),
        target_savings: (avg * goal / 100.0).round(),
        streak_goal: streak.saturating_add(1),
        achievement_goal: 1,
    }
}

impl GamificationEngine {
    /// Low-priority nudges about streaks, levels and challenges
    pub fn engagement_nudges(
        &self,
        snapshot: &UserStatSnapshot,
        as_of: NaiveDateTime,
    ) -> Vec<Notification> {
        let mut nudges = Vec::new();
        let streak = calculate_streak(snapshot.streak, snapshot.last_activity, as_of);
        let level = calculate_level(snapshot.total_points);

        if streak >= 7 {
            nudges.push(
                Notification::new(
                    NotificationKind::Motivation,
                    Priority::Low,
                    "Streak Champion!",
                    format!(
                        "You've been tracking for {} days! Keep up the great work.",
                        streak
                    ),
                )
                .with_action("Share your achievement with friends"),
            );
        } else if streak == 0 {
            nudges.push(
                Notification::new(
                    NotificationKind::Reminder,
                    Priority::Low,
                    "Start Your Streak",
                    "Log today's expenses to start building your tracking streak!",
                )
                .with_action("Add an expense now"),
            );
        }

        if level.level < NUDGE_LEVEL_CEILING {
            nudges.push(
                Notification::new(
                    NotificationKind::Achievement,
                    Priority::Low,
                    "Level Up!",
                    format!(
                        "You're level {}. Complete more achievements to reach level {}.",
                        level.level,
                        level.level + 1
                    ),
                )
                .with_action("View available achievements"),
            );
        }

        let any_active = self
            .challenge_progress(snapshot, as_of)
            .iter()
            .any(|c| c.active);
        if !any_active {
            nudges.push(
                Notification::new(
                    NotificationKind::Challenge,
                    Priority::Low,
                    "Take a Challenge",
                    "Try a new financial challenge to earn points and improve your habits.",
                )
                .with_action("Browse challenges"),
            );
        }

        nudges
    }
}
