//! Engine configuration
//!
//! Thresholds and registries (keyword table, service catalog, achievements,
//! challenges) are plain data with built-in defaults.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, else the override in the data dir
//!    (~/.local/share/spendwise/config/engine.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Sections missing from a file keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::categorize::{CategoryRule, Categorizer};
use crate::detect::{default_catalog, KnownService};
use crate::error::{Error, Result};
use crate::gamification::{default_achievements, default_challenges, Achievement, Challenge};
use crate::insights::predictor::PredictorConfig;
use crate::notify::NotificationConfig;

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Longest bill window or challenge accepted (ten years)
pub const MAX_SPAN_DAYS: i64 = 3650;

/// Everything the engine can be tuned with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    pub anomaly_threshold: f64,
    pub anomaly_recent_window: usize,
    pub predictor: PredictorConfig,
    /// Look-ahead for upcoming bills (days)
    pub bill_window_days: i64,
    pub notifications: NotificationConfig,
    pub categories: Vec<CategoryRule>,
    pub services: Vec<KnownService>,
    pub achievements: Vec<Achievement>,
    pub challenges: Vec<Challenge>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: 2.0,
            anomaly_recent_window: 5,
            predictor: PredictorConfig::default(),
            bill_window_days: 30,
            notifications: NotificationConfig::default(),
            categories: Categorizer::default_rules(),
            services: default_catalog(),
            achievements: default_achievements(),
            challenges: default_challenges(),
        }
    }
}

impl EngineConfig {
    /// Load from `path` if given, else from the default override location,
    /// else the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::NotFound(format!(
                        "Config file {}",
                        path.display()
                    )));
                }
                read_config(path)?
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => read_config(&default_path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// Parse TOML content over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendwise").join("config").join("engine.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "Loading engine config");
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    analysis: Option<RawAnalysis>,
    bills: Option<RawBills>,
    notifications: Option<RawNotifications>,
    categories: Option<Vec<CategoryRule>>,
    services: Option<Vec<KnownService>>,
    achievements: Option<Vec<Achievement>>,
    challenges: Option<Vec<Challenge>>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    anomaly_threshold: Option<f64>,
    anomaly_recent_window: Option<usize>,
    prediction_horizon: Option<u32>,
    prediction_noise: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawBills {
    window_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawNotifications {
    reminder_window_days: Option<i64>,
    due_soon_days: Option<i64>,
    spending_alert_ratio: Option<f64>,
    budget_warning_ratio: Option<f64>,
    savings_reminder_rate: Option<f64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(analysis) = raw.analysis {
        if let Some(threshold) = analysis.anomaly_threshold {
            config.anomaly_threshold = threshold;
        }
        if let Some(window) = analysis.anomaly_recent_window {
            config.anomaly_recent_window = window;
        }
        if let Some(horizon) = analysis.prediction_horizon {
            config.predictor.horizon = horizon;
        }
        if let Some(noise) = analysis.prediction_noise {
            config.predictor.noise = noise;
        }
    }

    if let Some(window) = raw.bills.and_then(|b| b.window_days) {
        config.bill_window_days = window;
    }

    if let Some(n) = raw.notifications {
        let target = &mut config.notifications;
        if let Some(v) = n.reminder_window_days {
            target.reminder_window_days = v;
        }
        if let Some(v) = n.due_soon_days {
            target.due_soon_days = v;
        }
        if let Some(v) = n.spending_alert_ratio {
            target.spending_alert_ratio = v;
        }
        if let Some(v) = n.budget_warning_ratio {
            target.budget_warning_ratio = v;
        }
        if let Some(v) = n.savings_reminder_rate {
            target.savings_reminder_rate = v;
        }
    }

    // Lists replace the built-ins wholesale
    if let Some(categories) = raw.categories {
        config.categories = categories;
    }
    if let Some(services) = raw.services {
        config.services = services;
    }
    if let Some(achievements) = raw.achievements {
        config.achievements = achievements;
    }
    if let Some(challenges) = raw.challenges {
        config.challenges = challenges;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &EngineConfig) -> Result<()> {
    if !(config.anomaly_threshold.is_finite() && config.anomaly_threshold > 0.0) {
        return Err(Error::Config(format!(
            "anomaly_threshold must be positive, got {}",
            config.anomaly_threshold
        )));
    }
    if !(0.0..=1.0).contains(&config.predictor.noise) {
        return Err(Error::Config(format!(
            "prediction_noise must be between 0 and 1, got {}",
            config.predictor.noise
        )));
    }
    if !(0..=MAX_SPAN_DAYS).contains(&config.bill_window_days) {
        return Err(Error::Config(format!(
            "bills.window_days must be between 0 and {}, got {}",
            MAX_SPAN_DAYS, config.bill_window_days
        )));
    }
    if let Some(c) = config
        .challenges
        .iter()
        .find(|c| !(1..=MAX_SPAN_DAYS).contains(&c.duration_days))
    {
        return Err(Error::Config(format!(
            "challenge {} needs a duration between 1 and {} days",
            c.id, MAX_SPAN_DAYS
        )));
    }
    Ok(())
}
