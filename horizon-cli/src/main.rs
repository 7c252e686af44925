//! Horizon CLI - net worth forecasting in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{categorize, config, demo, growth, networth, project, retire, similarity};

/// Horizon - net worth forecasting in your terminal
#[derive(Parser)]
#[command(name = "hz", version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log calculation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show net worth, its history or a period summary
    Networth {
        #[command(subcommand)]
        command: Option<networth::NetworthCommands>,
        /// Date to value at (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Estimate monthly growth from recent history
    Growth {
        /// Averaging method (mean, median, weighted)
        #[arg(long, default_value = "mean")]
        method: String,
        /// Reference date (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Project net worth forward
    Project {
        /// Comma-separated timeframes in years
        #[arg(long, value_delimiter = ',', default_values_t = vec![1u32, 5, 10])]
        years: Vec<u32>,
        /// Series spacing (monthly, quarterly, yearly)
        #[arg(long, default_value = "monthly")]
        interval: String,
        /// Monthly growth to use instead of history, in major units
        #[arg(long, allow_hyphen_values = true)]
        rate: Option<String>,
        /// Reference date (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Check whether retirement savings are on track
    Retire(retire::RetireArgs),

    /// Suggest and learn transaction categories
    Categorize {
        #[command(subcommand)]
        command: categorize::CategorizeCommands,
    },

    /// Compare two strings with Jaro-Winkler similarity
    Similarity {
        a: String,
        b: String,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// Inspect settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let json = cli.json;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                output::json_error(&e);
            } else {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by HORIZON_LOG, then RUST_LOG
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("HORIZON_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Networth { command, date } => networth::run(command, date.as_deref(), json),
        Commands::Growth { method, date } => growth::run(&method, date.as_deref(), json),
        Commands::Project {
            years,
            interval,
            rate,
            date,
        } => project::run(&years, &interval, rate.as_deref(), date.as_deref(), json),
        Commands::Retire(args) => retire::run(args, json),
        Commands::Categorize { command } => categorize::run(command, json),
        Commands::Similarity { a, b } => similarity::run(&a, &b, json),
        Commands::Demo { command } => demo::run(command, json),
        Commands::Config { command } => config::run(command, json),
    }
}
