//! Config command - show effective settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use horizon_core::adapters::csv_source::ACCOUNTS_FILE;
use horizon_core::config::Config;

use super::get_horizon_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print settings after defaults and environment overrides
    Show,
}

pub fn run(command: ConfigCommands, json: bool) -> Result<()> {
    match command {
        ConfigCommands::Show => show(json),
    }
}

fn show(json: bool) -> Result<()> {
    let horizon_dir = get_horizon_dir()?;
    let config = Config::load(&horizon_dir)?;
    let settings = config.to_json()?;

    if json {
        return output::json(&settings);
    }

    let source = if config.demo_mode {
        "demo dataset".to_string()
    } else if horizon_dir.join(ACCOUNTS_FILE).exists() {
        format!("CSV files in {}", horizon_dir.display())
    } else {
        format!("none ({} missing)", ACCOUNTS_FILE)
    };

    println!("{} {}", "Horizon directory:".bold(), horizon_dir.display());
    println!("{} {}", "Data source:".bold(), source);
    println!();
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
