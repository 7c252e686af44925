//! Demo command - manage demo mode

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use horizon_core::config::Config;
use serde_json::json;

use super::get_horizon_dir;
use crate::output;

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode
    #[command(name = "on")]
    On,
    /// Disable demo mode
    #[command(name = "off")]
    Off,
    /// Show demo mode status
    Status,
}

pub fn run(command: Option<DemoCommands>, json: bool) -> Result<()> {
    let horizon_dir = get_horizon_dir()?;
    std::fs::create_dir_all(&horizon_dir)?;
    let mut config = Config::load(&horizon_dir)?;

    match command {
        Some(DemoCommands::On) => {
            config.enable_demo_mode();
            config.save(&horizon_dir)?;
            if json {
                return output::json(json!({ "demo_mode": true }));
            }
            println!("{}", "Demo mode enabled".green());
            println!("Run 'hz networth' or 'hz project' to explore the demo accounts.");
        }
        Some(DemoCommands::Off) => {
            config.disable_demo_mode();
            config.save(&horizon_dir)?;
            if json {
                return output::json(json!({ "demo_mode": false }));
            }
            println!("{}", "Demo mode disabled".yellow());
        }
        Some(DemoCommands::Status) | None => {
            if json {
                return output::json(json!({ "demo_mode": config.demo_mode }));
            }
            if config.demo_mode {
                println!("Demo mode is {}", "ON".green());
            } else {
                println!("Demo mode is {}", "OFF".yellow());
            }
        }
    }
    Ok(())
}
