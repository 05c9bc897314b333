//! Category lookup command

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use super::{load_engine, print_json};

pub fn cmd_categorize(
    config: Option<&Path>,
    description: &str,
    amount: f64,
    json: bool,
) -> Result<()> {
    let engine = load_engine(config)?;
    let category = engine.categorizer().categorize(description, amount);

    if json {
        return print_json(&json!({
            "description": description,
            "amount": amount,
            "category": category,
        }));
    }

    println!("🏷️  {} → {}", description, category);
    Ok(())
}
