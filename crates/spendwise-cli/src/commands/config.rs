//! Config commands

use std::path::Path;

use anyhow::{Context, Result};
use spendwise_core::config::default_config_path;
use spendwise_core::EngineConfig;

use super::print_json;

/// Print the effective config as JSON
pub fn cmd_config_show(config: Option<&Path>) -> Result<()> {
    let config = EngineConfig::load(config).context("Failed to load engine config")?;
    print_json(&config)
}

pub fn cmd_config_path(config: Option<&Path>) -> Result<()> {
    if let Some(path) = config {
        println!("{} (--config)", path.display());
        return Ok(());
    }

    match default_config_path() {
        Some(path) if path.exists() => println!("{}", path.display()),
        Some(path) => println!("{} (not present, using built-in defaults)", path.display()),
        None => println!("No data directory on this platform, using built-in defaults"),
    }
    Ok(())
}
