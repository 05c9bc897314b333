//! Level, challenge and achievement commands
//!
//! The engine only reports; these commands are where the profile file gets
//! rewritten, and only when asked (`challenge start`, `achievements --apply`).

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use spendwise_core::gamification::{calculate_level, ChallengeState};
use spendwise_core::import;
use spendwise_core::UserProfile;

use super::{
    load_engine, load_profile, load_transactions, print_json, resolve_as_of, save_profile,
};

pub fn cmd_level(points: u64, json: bool) -> Result<()> {
    let level = calculate_level(points);

    if json {
        return print_json(&level);
    }

    let filled = (level.progress / 10.0).round() as usize;
    println!();
    println!("🏆 Level {}", level.level);
    println!(
        "   [{}{}] {:.0}% │ {} points │ {} to next level",
        "█".repeat(filled),
        "░".repeat(10 - filled.min(10)),
        level.progress,
        level.total_points,
        level.points_to_next
    );
    Ok(())
}

pub fn cmd_challenges_list(
    config: Option<&Path>,
    file: Option<&Path>,
    profile: Option<&Path>,
    as_of: Option<&str>,
    json: bool,
) -> Result<()> {
    let engine = load_engine(config)?;
    let transactions = match file {
        Some(file) => load_transactions(file)?,
        None => Vec::new(),
    };
    let profile = load_profile(profile)?;
    let as_of = resolve_as_of(as_of)?;

    let snapshot = engine.snapshot(&transactions, &profile);
    let progress = engine.gamification().challenge_progress(&snapshot, as_of);

    if json {
        return print_json(&progress);
    }

    println!();
    println!("🎯 Challenges");
    println!("   ─────────────────────────────────────────────────────────────");

    for c in &progress {
        let icon = match c.state {
            ChallengeState::NotStarted => "⚪",
            ChallengeState::Active => "🟢",
            ChallengeState::Completed => "✅",
            ChallengeState::Expired => "⌛",
        };
        println!(
            "   {} {:16} │ {:3.0}% │ {:>3} pts │ {} days │ {}",
            icon, c.id, c.progress, c.reward, c.duration_days, c.title
        );
    }

    Ok(())
}

pub fn cmd_challenge_start(
    config: Option<&Path>,
    id: &str,
    profile_path: &Path,
    as_of: Option<&str>,
) -> Result<()> {
    let engine = load_engine(config)?;
    let as_of = resolve_as_of(as_of)?;

    let mut profile = if profile_path.exists() {
        import::load_profile(profile_path)
            .with_context(|| format!("Failed to load profile from {}", profile_path.display()))?
    } else {
        UserProfile::default()
    };

    let challenge = engine
        .gamification()
        .challenge(id)
        .ok_or_else(|| anyhow::anyhow!("Unknown challenge: {}", id))?;

    let snapshot = engine.snapshot(&[], &profile);
    let Some(entry) = engine.gamification().start_challenge(id, &snapshot, as_of) else {
        println!("ℹ️  {} is already in your profile", challenge.title);
        return Ok(());
    };

    profile.active_challenges.push(entry);
    save_profile(profile_path, &profile)?;

    println!(
        "✅ Started {} ({} days, {} points)",
        challenge.title, challenge.duration_days, challenge.reward
    );
    Ok(())
}

pub fn cmd_achievements(
    config: Option<&Path>,
    file: &Path,
    profile_path: Option<&Path>,
    apply: bool,
    json: bool,
) -> Result<()> {
    if apply && profile_path.is_none() {
        anyhow::bail!("--apply needs --profile to know where to save");
    }

    let engine = load_engine(config)?;
    let transactions = load_transactions(file)?;
    let profile = load_profile(profile_path)?;

    let snapshot = engine.snapshot(&transactions, &profile);
    let delta = engine.gamification().check_achievements(&snapshot);

    if apply {
        if let Some(path) = profile_path {
            if !delta.is_empty() {
                save_profile(path, &delta.applied_to(&profile))?;
            }
        }
    }

    if json {
        return print_json(&json!({
            "unlocked": delta.unlocked,
            "points_earned": delta.points_earned,
            "applied": apply && !delta.is_empty(),
        }));
    }

    if delta.is_empty() {
        println!("No new achievements. Keep going!");
        return Ok(());
    }

    println!();
    println!("🎉 New Achievements");
    println!("   ─────────────────────────────────────────────────────────────");
    for a in &delta.unlocked {
        println!("   {:20} │ +{:>3} │ {}", a.title, a.points, a.description);
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   +{} points", delta.points_earned);
    if apply {
        println!("   Saved to profile");
    }

    Ok(())
}
