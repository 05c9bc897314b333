//! Shared types for the insight analyzers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Priority;

/// Severity level of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational - no action needed
    Info,
    /// Worth changing a habit over
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Info => 1,
            Severity::Warning => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// An observation about the user's spending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Stable key for deduplication (e.g., "savings:low_rate")
    pub key: String,
    pub severity: Severity,
    /// Short title (e.g., "Low Savings Rate")
    pub title: String,
    /// One-line summary with the numbers filled in
    pub message: String,
    /// Suggested next step
    pub action: Option<String>,
    /// Finding-specific structured data
    pub data: serde_json::Value,
}

impl Finding {
    pub fn new(
        key: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            severity,
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

    /// Add structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// Area a recommendation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Savings,
    Category,
    Budget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub action: String,
    /// Dollars a month this could free up, when it can be estimated
    pub potential_savings: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            Self::Increasing
        } else if slope < 0.0 {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

/// Direction of one category's monthly spend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trend {
    pub category: String,
    pub direction: TrendDirection,
    /// Absolute slope in dollars per month
    pub rate: f64,
    pub confidence: f64,
    /// Months with data that went into the fit
    pub months: usize,
}
