//! Full analysis command

use std::path::Path;

use anyhow::Result;
use spendwise_core::models::Priority;
use spendwise_core::{AnalysisRequest, InsightBundle};

use super::{load_engine, load_profile, load_transactions, print_json, resolve_as_of, truncate};

pub fn cmd_analyze(
    config: Option<&Path>,
    file: &Path,
    profile: Option<&Path>,
    as_of: Option<&str>,
    seed: u64,
    json: bool,
) -> Result<()> {
    let engine = load_engine(config)?;
    let transactions = load_transactions(file)?;
    let profile = load_profile(profile)?;
    let as_of = resolve_as_of(as_of)?;

    let bundle =
        engine.analyze(&AnalysisRequest::new(&transactions, &profile, as_of).with_seed(seed));

    if json {
        return print_json(&bundle);
    }

    print_summary(&bundle);
    Ok(())
}

fn print_summary(bundle: &InsightBundle) {
    println!();
    println!("👋 {}", bundle.welcome_message);

    println!();
    println!("💯 Financial Health: {}/100", bundle.health.score);
    println!("   ─────────────────────────────────────────────────────────────");
    let b = &bundle.health.breakdown;
    println!(
        "   savings {:.0} │ budget {:.0} │ diversity {:.0} │ emergency {:.0} │ consistency {:.0}",
        b.savings, b.budget, b.diversity, b.emergency_fund, b.consistency
    );

    let p = &bundle.personality;
    println!();
    println!("🧭 Spending Personality: {}", p.personality_type);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   savings rate {:.1}% │ impulse {:.0}% │ planning {:.1}/10",
        p.savings_rate,
        p.impulse_ratio * 100.0,
        p.planning_score
    );
    for t in &p.traits {
        println!("   • {}", t);
    }

    if !bundle.notifications.is_empty() {
        println!();
        println!("🔔 Notifications");
        println!("   ─────────────────────────────────────────────────────────────");
        for n in &bundle.notifications {
            let icon = match n.priority {
                Priority::High => "🔴",
                Priority::Medium => "🟡",
                Priority::Low => "🟢",
            };
            println!("   {} {}: {}", icon, n.title, n.message);
        }
    }

    if !bundle.insights.is_empty() || !bundle.recommendations.is_empty() {
        println!();
        println!("💡 Insights");
        println!("   ─────────────────────────────────────────────────────────────");
        for f in &bundle.insights {
            println!("   {} {}", f.title, f.message);
        }
        for r in &bundle.recommendations {
            let savings = r
                .potential_savings
                .map(|s| format!(" (save ~${:.2})", s))
                .unwrap_or_default();
            println!("   → {}: {}{}", r.title, r.action, savings);
        }
    }

    if !bundle.anomalies.is_empty() {
        println!();
        println!("⚠️  Unusual Charges");
        println!("   ─────────────────────────────────────────────────────────────");
        for a in &bundle.anomalies {
            println!(
                "   {:25} │ {:>10} │ {:.1}x the {} average (${:.2})",
                truncate(a.description.as_deref().unwrap_or(&a.category), 25),
                format!("${:.2}", a.amount),
                a.severity,
                a.category,
                a.average
            );
        }
    }

    if !bundle.trends.is_empty() {
        println!();
        println!("📈 Trends");
        println!("   ─────────────────────────────────────────────────────────────");
        for t in &bundle.trends {
            println!(
                "   {:15} │ {:10} │ ${:.2}/month over {} months",
                t.category,
                t.direction.as_str(),
                t.rate,
                t.months
            );
        }
    }

    if !bundle.predictions.is_empty() {
        println!();
        println!("🔮 Next Month");
        println!("   ─────────────────────────────────────────────────────────────");
        for p in bundle.predictions.iter().filter(|p| p.month_offset == 1) {
            println!(
                "   {:15} │ {:>10} │ {:.0}% confidence",
                p.category,
                format!("${:.2}", p.predicted_amount),
                p.confidence * 100.0
            );
        }
    }

    if !bundle.upcoming_bills.is_empty() {
        println!();
        println!("📅 Upcoming Bills");
        println!("   ─────────────────────────────────────────────────────────────");
        for bill in &bundle.upcoming_bills {
            println!(
                "   {:25} │ {:>10} │ due {}",
                truncate(&bill.name, 25),
                format!("${:.2}", bill.amount),
                bill.due_date.date()
            );
        }
    }

    println!();
    println!(
        "🏆 Level {} │ {} points │ {} to next │ {}-day streak",
        bundle.level_info.level,
        bundle.level_info.total_points,
        bundle.level_info.points_to_next,
        bundle.streak
    );
    for a in &bundle.new_achievements.unlocked {
        println!("   🎉 Unlocked {} (+{} points)", a.title, a.points);
    }
    println!(
        "   Today: spend under ${:.0}, save ${:.0}",
        bundle.daily_goals.max_daily_spending, bundle.daily_goals.target_savings
    );

    if let Some(tip) = &bundle.mood_tip {
        println!();
        println!("🧘 {}", tip.title);
        println!("   {}", tip.message);
    }
}
