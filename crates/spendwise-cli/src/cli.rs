//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendwise - Spending insights, bills and habits
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Behavior analytics for your expense history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config file (defaults to the data dir override, then built-ins)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full analysis cycle
    Analyze {
        /// Transactions file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// User profile (JSON)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Analyze as of this time (defaults to now)
        #[arg(long)]
        as_of: Option<String>,

        /// Seed for prediction noise
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Show the category a description would get
    Categorize {
        /// Merchant or memo text
        description: String,

        /// Amount, used when no keyword matches
        #[arg(short, long, default_value = "0")]
        amount: f64,
    },

    /// List recurring charges found in a transactions file
    Subscriptions {
        /// Transactions file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Detect as of this time (defaults to now)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List bills due soon
    Bills {
        /// Transactions file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Look-ahead in days (defaults to the configured window)
        #[arg(short, long)]
        days: Option<i64>,

        /// Start of the look-ahead (defaults to now)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Show level progress for a point total
    Level {
        /// Total points
        points: u64,
    },

    /// Challenges (list, start)
    Challenge {
        #[command(subcommand)]
        action: ChallengeAction,
    },

    /// Check for newly unlocked achievements
    Achievements {
        /// Transactions file (CSV or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// User profile (JSON)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Save unlocked achievements and points back to the profile
        #[arg(long)]
        apply: bool,
    },

    /// Engine configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Show every challenge with its progress
    List {
        /// Transactions file (CSV or JSON)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// User profile (JSON)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        #[arg(long)]
        as_of: Option<String>,
    },

    /// Start a challenge and record it in the profile
    Start {
        /// Challenge id (e.g. no_coffee_week)
        id: String,

        /// User profile (JSON), created if missing
        #[arg(short, long)]
        profile: PathBuf,

        #[arg(long)]
        as_of: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print where the config override is read from
    Path,
}
