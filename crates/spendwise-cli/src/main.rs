//! Spendwise CLI - spending insights from an expense history
//!
//! Usage:
//!   spendwise analyze --file history.csv --profile me.json
//!   spendwise subscriptions --file history.csv
//!   spendwise bills --file history.csv --days 14
//!   spendwise challenge start no_coffee_week --profile me.json

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = cli.config.as_deref();
    let json = cli.json;

    match cli.command {
        Commands::Analyze {
            file,
            profile,
            as_of,
            seed,
        } => commands::cmd_analyze(
            config,
            &file,
            profile.as_deref(),
            as_of.as_deref(),
            seed,
            json,
        ),
        Commands::Categorize {
            description,
            amount,
        } => commands::cmd_categorize(config, &description, amount, json),
        Commands::Subscriptions { file, as_of } => {
            commands::cmd_subscriptions(config, &file, as_of.as_deref(), json)
        }
        Commands::Bills { file, days, as_of } => {
            commands::cmd_bills(config, &file, days, as_of.as_deref(), json)
        }
        Commands::Level { points } => commands::cmd_level(points, json),
        Commands::Challenge { action } => match action {
            ChallengeAction::List {
                file,
                profile,
                as_of,
            } => commands::cmd_challenges_list(
                config,
                file.as_deref(),
                profile.as_deref(),
                as_of.as_deref(),
                json,
            ),
            ChallengeAction::Start { id, profile, as_of } => {
                commands::cmd_challenge_start(config, &id, &profile, as_of.as_deref())
            }
        },
        Commands::Achievements {
            file,
            profile,
            apply,
        } => commands::cmd_achievements(config, &file, profile.as_deref(), apply, json),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::cmd_config_show(config),
            ConfigAction::Path => commands::cmd_config_path(config),
        },
    }
}
