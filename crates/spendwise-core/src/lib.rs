//! Spendwise Core Library
//!
//! Behavior analytics for a personal expense tracker:
//! - Keyword categorization with an amount fallback
//! - Spending predictions, anomalies and category trends
//! - Spending personality and a 0-100 financial health score
//! - Recurring charge detection and upcoming bills
//! - Rule-based notifications
//! - Achievements, challenges, levels and streaks
//! - CSV/JSON transaction loading and TOML engine config
//!
//! Every analysis is a pure function of the transactions, the stored user
//! profile and an explicit `as_of` timestamp.

pub mod categorize;
pub mod config;
pub mod detect;
pub mod error;
pub mod gamification;
pub mod import;
pub mod insights;
pub mod models;
pub mod notify;
pub mod stats;

/// Transaction and timestamp builders for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categorize::{CategoryRule, Categorizer};
pub use config::EngineConfig;
pub use detect::{KnownService, RecurrenceDetector, RecurringCharge, UpcomingBill};
pub use error::{Error, Result};
pub use gamification::{AchievementDelta, GamificationEngine};
pub use insights::{AnalysisRequest, InsightBundle, InsightEngine};
pub use models::{Transaction, TransactionKind, UserProfile, UserStatSnapshot};
pub use notify::{Notification, NotificationEngine, NotificationKind};
