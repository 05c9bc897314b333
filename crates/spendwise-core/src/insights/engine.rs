//! Insight Engine - orchestrates one analysis cycle

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::categorize::Categorizer;
use crate::config::EngineConfig;
use crate::detect::{RecurrenceDetector, RecurringCharge, UpcomingBill};
use crate::gamification::{
    calculate_level, calculate_streak, daily_goals, AchievementDelta, ChallengeProgress,
    DailyGoals, GamificationEngine, LevelInfo,
};
use crate::models::{self, Transaction, UserProfile, UserStatSnapshot};
use crate::notify::{sort_by_priority, Notification, NotificationEngine, NotificationInput};
use crate::stats;

use super::advice;
use super::anomaly::{Anomaly, AnomalyDetector};
use super::health::{health_score, HealthInput, HealthScore};
use super::personality::{analyze_personality, PersonalityProfile};
use super::predictor::{Prediction, Predictor};
use super::types::{Finding, Recommendation, Trend};
use super::welcome::{mood_tip, welcome_message, MoodTip};

/// Inputs for one cycle
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub transactions: &'a [Transaction],
    pub profile: &'a UserProfile,
    pub as_of: NaiveDateTime,
    /// Seeds the prediction noise
    pub seed: u64,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(
        transactions: &'a [Transaction],
        profile: &'a UserProfile,
        as_of: NaiveDateTime,
    ) -> Self {
        Self {
            transactions,
            profile,
            as_of,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Everything one cycle produces, recomputed wholesale on every call
#[derive(Debug, Clone, Serialize)]
pub struct InsightBundle {
    pub as_of: NaiveDateTime,
    pub insights: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
    pub trends: Vec<Trend>,
    pub predictions: Vec<Prediction>,
    pub anomalies: Vec<Anomaly>,
    pub personality: PersonalityProfile,
    pub health: HealthScore,
    pub subscriptions: Vec<RecurringCharge>,
    pub upcoming_bills: Vec<UpcomingBill>,
    pub notifications: Vec<Notification>,
    /// Unlocks to apply to the stored profile
    pub new_achievements: AchievementDelta,
    pub challenge_progress: Vec<ChallengeProgress>,
    /// Includes points earned this cycle
    pub level_info: LevelInfo,
    pub streak: u32,
    pub daily_goals: DailyGoals,
    pub welcome_message: String,
    pub mood_tip: Option<MoodTip>,
}

/// The main insight engine. Immutable once built.
#[derive(Debug, Clone)]
pub struct InsightEngine {
    categorizer: Categorizer,
    predictor: Predictor,
    anomalies: AnomalyDetector,
    recurrence: RecurrenceDetector,
    notifications: NotificationEngine,
    gamification: GamificationEngine,
    bill_window_days: i64,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl InsightEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            categorizer: Categorizer::with_rules(config.categories.clone()),
            predictor: Predictor::new(config.predictor.clone()),
            anomalies: AnomalyDetector::new(config.anomaly_threshold)
                .with_recent_window(config.anomaly_recent_window),
            recurrence: RecurrenceDetector::with_catalog(config.services.clone()),
            notifications: NotificationEngine::new(config.notifications.clone()),
            gamification: GamificationEngine::with_registry(
                config.achievements.clone(),
                config.challenges.clone(),
            ),
            bill_window_days: config.bill_window_days,
        }
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    pub fn recurrence(&self) -> &RecurrenceDetector {
        &self.recurrence
    }

    pub fn gamification(&self) -> &GamificationEngine {
        &self.gamification
    }

    pub fn bill_window_days(&self) -> i64 {
        self.bill_window_days
    }

    /// Copies of the transactions with every category filled in
    pub fn categorized(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .map(|tx| {
                let mut tx = tx.clone();
                tx.category = Some(self.categorizer.resolve(&tx));
                tx
            })
            .collect()
    }

    /// Income from the profile, else summed from income records
    pub fn resolve_income(profile: &UserProfile, transactions: &[Transaction]) -> f64 {
        profile
            .monthly_income
            .unwrap_or_else(|| models::incomes(transactions).iter().map(|t| t.amount).sum())
    }

    /// Stat snapshot for gamification-only callers
    pub fn snapshot(&self, transactions: &[Transaction], profile: &UserProfile) -> UserStatSnapshot {
        let transactions = self.categorized(transactions);
        let expenses = models::expenses(&transactions);
        let income = Self::resolve_income(profile, &transactions);
        UserStatSnapshot::from_activity(profile, &expenses, stats::savings_rate(&expenses, income))
    }

    /// Run every analyzer for one cycle
    pub fn analyze(&self, request: &AnalysisRequest<'_>) -> InsightBundle {
        let as_of = request.as_of;
        let profile = request.profile;

        let transactions = self.categorized(request.transactions);
        let expenses = models::expenses(&transactions);
        let income = Self::resolve_income(profile, &transactions);
        let budget = profile.monthly_budget.unwrap_or(income);
        let savings_rate = stats::savings_rate(&expenses, income);
        debug!(
            transactions = transactions.len(),
            expenses = expenses.len(),
            income,
            savings_rate,
            "Inputs resolved"
        );

        let mut rng = StdRng::seed_from_u64(request.seed);
        let predictions = self.predictor.predict(&expenses, &mut rng);
        debug!(count = predictions.len(), "Predictions complete");

        let anomalies = self.anomalies.detect(&expenses);
        debug!(count = anomalies.len(), "Anomaly detection complete");

        let personality = analyze_personality(&expenses, income);
        debug!(personality = %personality.personality_type, "Personality analysis complete");

        let health = health_score(&HealthInput {
            expenses: &expenses,
            income,
            savings_balance: profile.savings_balance,
            monthly_budget: budget,
            as_of,
        });
        debug!(score = health.score, "Health score complete");

        let mut insights = advice::observations(&expenses, income);
        insights.sort_by(|a, b| b.severity.priority().cmp(&a.severity.priority()));
        let recommendations = advice::recommendations(&expenses, income, as_of);
        let trends = advice::trends(&expenses, as_of);
        debug!(
            insights = insights.len(),
            recommendations = recommendations.len(),
            trends = trends.len(),
            "Advice complete"
        );

        let subscriptions = self.recurrence.detect(&expenses, as_of);
        let upcoming_bills =
            self.recurrence
                .upcoming_bills(&subscriptions, &expenses, as_of, self.bill_window_days);
        debug!(
            subscriptions = subscriptions.len(),
            upcoming = upcoming_bills.len(),
            "Bill detection complete"
        );

        let snapshot = UserStatSnapshot::from_activity(profile, &expenses, savings_rate);

        let mut notifications = self.notifications.generate(&NotificationInput {
            bills: &upcoming_bills,
            expenses: &expenses,
            monthly_budget: budget,
            savings_rate,
            as_of,
        });
        notifications.extend(self.gamification.engagement_nudges(&snapshot, as_of));
        sort_by_priority(&mut notifications);
        debug!(count = notifications.len(), "Notifications complete");

        let new_achievements = self.gamification.check_achievements(&snapshot);
        let challenge_progress = self.gamification.challenge_progress(&snapshot, as_of);
        let level_info = calculate_level(profile.total_points + new_achievements.points_earned);
        let streak = calculate_streak(profile.current_streak, profile.last_activity, as_of);
        let goals = daily_goals(
            stats::average_daily_spending(&expenses),
            profile.savings_goal_percent,
            streak,
        );
        debug!(
            unlocked = new_achievements.unlocked.len(),
            level = level_info.level,
            streak,
            "Gamification complete"
        );

        let welcome = welcome_message(
            profile.name.as_deref(),
            Some(personality.personality_type),
            as_of,
        );

        info!(
            insights = insights.len(),
            predictions = predictions.len(),
            anomalies = anomalies.len(),
            subscriptions = subscriptions.len(),
            notifications = notifications.len(),
            health = health.score,
            "Analysis complete"
        );

        InsightBundle {
            as_of,
            insights,
            recommendations,
            trends,
            predictions,
            anomalies,
            personality,
            health,
            subscriptions,
            upcoming_bills,
            notifications,
            new_achievements,
            challenge_progress,
            level_info,
            streak,
            daily_goals: goals,
            welcome_message: welcome,
            mood_tip: profile.mood.map(mood_tip),
        }
    }
}
