//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Full analysis cycle
//! - `categorize` - Category lookup for a description
//! - `config` - Effective config and override location
//! - `gamification` - Level, challenges and achievements
//! - `subscriptions` - Recurring charges and upcoming bills

pub mod analyze;
pub mod categorize;
pub mod config;
pub mod gamification;
pub mod subscriptions;

// Re-export command functions for main.rs
pub use analyze::*;
pub use categorize::*;
pub use config::*;
pub use gamification::*;
pub use subscriptions::*;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use spendwise_core::import::{self, parse_datetime};
use spendwise_core::{EngineConfig, InsightEngine, Transaction, UserProfile};

/// Build the engine from the resolved config
pub fn load_engine(config: Option<&Path>) -> Result<InsightEngine> {
    let config = EngineConfig::load(config).context("Failed to load engine config")?;
    Ok(InsightEngine::new(&config))
}

/// Parse `--as-of`, defaulting to the local time now
pub fn resolve_as_of(as_of: Option<&str>) -> Result<NaiveDateTime> {
    match as_of {
        Some(s) => parse_datetime(s)
            .ok_or_else(|| anyhow::anyhow!("Invalid --as-of (use YYYY-MM-DD or YYYY-MM-DDTHH:MM)")),
        None => Ok(chrono::Local::now().naive_local()),
    }
}

pub fn load_transactions(file: &Path) -> Result<Vec<Transaction>> {
    import::load_transactions(file)
        .with_context(|| format!("Failed to load transactions from {}", file.display()))
}

/// Profile from `path`, or an empty one when no path is given
pub fn load_profile(path: Option<&Path>) -> Result<UserProfile> {
    match path {
        Some(path) => import::load_profile(path)
            .with_context(|| format!("Failed to load profile from {}", path.display())),
        None => Ok(UserProfile::default()),
    }
}

pub fn save_profile(path: &Path, profile: &UserProfile) -> Result<()> {
    let content = serde_json::to_string_pretty(profile)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write profile to {}", path.display()))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
