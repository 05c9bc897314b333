//! Spending personality classification

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Transaction;
use crate::stats;

/// Categories that are planned by nature
const PLANNED_CATEGORIES: [&str; 4] = ["rent", "mortgage", "utilities", "insurance"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonalityType {
    Saver,
    Planner,
    Spender,
    Balancer,
}

impl PersonalityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saver => "Saver",
            Self::Planner => "Planner",
            Self::Spender => "Spender",
            Self::Balancer => "Balancer",
        }
    }

    pub fn traits(&self) -> [&'static str; 3] {
        match self {
            Self::Saver => ["Disciplined", "Future-oriented", "Risk-averse"],
            Self::Planner => ["Organized", "Balanced", "Goal-oriented"],
            Self::Spender => ["Impulsive", "Present-focused", "Social"],
            Self::Balancer => ["Flexible", "Adaptive", "Moderate"],
        }
    }

    pub fn recommendations(&self) -> [&'static str; 3] {
        match self {
            Self::Saver => [
                "Consider investing your savings for better returns",
                "You might be too conservative - allow yourself some fun spending",
                "Great job! Keep up the excellent financial habits",
            ],
            Self::Planner => [
                "Set specific financial goals to stay motivated",
                "Consider automating your savings",
                "Track your progress regularly",
            ],
            Self::Spender => [
                "Use the 24-hour rule before making purchases",
                "Set up automatic savings transfers",
                "Track your spending daily to build awareness",
            ],
            Self::Balancer => [
                "Focus on building an emergency fund",
                "Set up automatic bill payments",
                "Review your spending patterns monthly",
            ],
        }
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PersonalityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "saver" => Ok(Self::Saver),
            "planner" => Ok(Self::Planner),
            "spender" => Ok(Self::Spender),
            "balancer" => Ok(Self::Balancer),
            _ => Err(format!("Unknown personality type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub personality_type: PersonalityType,
    pub traits: Vec<String>,
    pub recommendations: Vec<String>,
    pub savings_rate: f64,
    /// Share of spend on weekends or late at night, 0 to 1
    pub impulse_ratio: f64,
    /// 0 to 10
    pub planning_score: f64,
}

/// Classify from expenses and income. Deterministic.
pub fn analyze_personality(expenses: &[&Transaction], income: f64) -> PersonalityProfile {
    let savings_rate = stats::savings_rate(expenses, income);
    let impulse_ratio = impulse_ratio(expenses);
    let planning_score = planning_score(expenses);

    let personality_type = if savings_rate >= 25.0 && planning_score >= 7.0 {
        PersonalityType::Saver
    } else if savings_rate >= 10.0 && impulse_ratio < 0.3 {
        PersonalityType::Planner
    } else if impulse_ratio > 0.5 {
        PersonalityType::Spender
    } else {
        PersonalityType::Balancer
    };

    PersonalityProfile {
        personality_type,
        traits: personality_type.traits().iter().map(|s| s.to_string()).collect(),
        recommendations: personality_type
            .recommendations()
            .iter()
            .map(|s| s.to_string())
            .collect(),
        savings_rate,
        impulse_ratio,
        planning_score,
    }
}

/// Fraction of spend made at impulse times
pub fn impulse_ratio(expenses: &[&Transaction]) -> f64 {
    let total = stats::total_amount(expenses);
    if total <= 0.0 {
        return 0.0;
    }
    let impulse: f64 = expenses
        .iter()
        .filter(|t| t.is_impulse_time())
        .map(|t| t.amount)
        .sum();
    impulse / total
}

/// Share of planned-looking expenses scaled to 0..=10
pub fn planning_score(expenses: &[&Transaction]) -> f64 {
    if expenses.is_empty() {
        return 0.0;
    }
    let planned = expenses.iter().filter(|t| is_planned(t)).count();
    (planned as f64 / expenses.len() as f64 * 10.0).min(10.0)
}

fn is_planned(tx: &Transaction) -> bool {
    let category = tx.category_or_other().to_lowercase();
    PLANNED_CATEGORIES.contains(&category.as_str())
        || (tx.amount > 100.0 && tx.amount % 50.0 == 0.0)
}
