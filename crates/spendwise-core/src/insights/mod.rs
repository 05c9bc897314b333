//! Insight Engine - one analysis cycle over a transaction history
//!
//! The engine takes the caller's transactions and stored profile and returns
//! everything the presentation layer shows in a single [`InsightBundle`].
//! It never mutates the profile; unlocked achievements come back as a delta.
//!
//! ## Analyzers
//!
//! - **Predictor** - next months' spend per category
//! - **Anomaly Detector** - recent charges far above their category mean
//! - **Personality** - saver / planner / spender / balancer
//! - **Health** - 0 to 100 score with a breakdown
//! - **Advice** - observations, recommendations and category trends
//! - **Welcome** - greeting and mood tips
//!
//! Recurring charges, notifications and gamification live in their own
//! modules and are wired in by the engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendwise_core::insights::{AnalysisRequest, InsightEngine};
//!
//! let engine = InsightEngine::new(&EngineConfig::default());
//! let bundle = engine.analyze(&AnalysisRequest::new(&transactions, &profile, now));
//! ```

pub mod advice;
pub mod anomaly;
pub mod engine;
pub mod health;
pub mod personality;
pub mod predictor;
pub mod types;
pub mod welcome;

pub use anomaly::{Anomaly, AnomalyDetector};
pub use engine::{AnalysisRequest, InsightBundle, InsightEngine};
pub use health::{health_score, HealthBreakdown, HealthInput, HealthScore};
pub use personality::{analyze_personality, PersonalityProfile, PersonalityType};
pub use predictor::{Prediction, Predictor, PredictorConfig};
pub use types::{
    Finding, Recommendation, RecommendationKind, Severity, Trend, TrendDirection,
};
pub use welcome::{mood_tip, welcome_message, MoodTip};
