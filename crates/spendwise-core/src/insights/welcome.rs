//! Greeting and mood tips

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::personality::PersonalityType;
use crate::models::Mood;

/// Greeting for the time of day, tailored to the personality type
pub fn welcome_message(
    name: Option<&str>,
    personality: Option<PersonalityType>,
    as_of: NaiveDateTime,
) -> String {
    let greeting = match as_of.hour() {
        h if h < 12 => "Good morning",
        h if h < 17 => "Good afternoon",
        _ => "Good evening",
    };
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("there");

    match personality {
        Some(PersonalityType::Saver) => format!(
            "{}, {}! Your disciplined approach to finances is inspiring.",
            greeting, name
        ),
        Some(PersonalityType::Spender) => format!(
            "{}, {}! Let's work together to build better spending habits.",
            greeting, name
        ),
        Some(PersonalityType::Planner) => format!(
            "{}, {}! Your organized approach to finances is paying off.",
            greeting, name
        ),
        Some(PersonalityType::Balancer) | None => {
            format!("{}, {}! Ready to track your finances today?", greeting, name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodTip {
    pub title: String,
    pub message: String,
    pub action: String,
}

pub fn mood_tip(mood: Mood) -> MoodTip {
    let (title, message, action) = match mood {
        Mood::Stressed => (
            "Take a Financial Break",
            "When stressed, we tend to make impulsive financial decisions. Consider waiting 24 hours before any major purchase.",
            "Set a spending pause reminder",
        ),
        Mood::Happy => (
            "Celebrate Responsibly",
            "Great mood! Remember to stick to your budget even when celebrating.",
            "Set a celebration budget",
        ),
        Mood::Tired => (
            "Avoid Late-Night Spending",
            "Late-night shopping can lead to impulse purchases. Consider reviewing your expenses tomorrow.",
            "Schedule expense review",
        ),
    };

    MoodTip {
        title: title.to_string(),
        message: message.to_string(),
        action: action.to_string(),
    }
}
