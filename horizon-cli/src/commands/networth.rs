//! Networth command - current net worth, timeline and period summary

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use horizon_core::calendar::add_months_clamped;
use horizon_core::TimelineInterval;

use super::{get_context, resolve_date};
use crate::output;

#[derive(Subcommand)]
pub enum NetworthCommands {
    /// Net worth at regular intervals
    Timeline {
        /// First date (defaults to one year before --end)
        #[arg(long)]
        start: Option<String>,
        /// Last date (defaults to today)
        #[arg(long)]
        end: Option<String>,
        /// Spacing (daily, weekly, monthly, quarterly, yearly)
        #[arg(long, default_value = "monthly")]
        interval: String,
    },
    /// Change in net worth between two dates
    Summary {
        /// First date (defaults to one year before --end)
        #[arg(long)]
        start: Option<String>,
        /// Last date (defaults to today)
        #[arg(long)]
        end: Option<String>,
    },
}

pub fn run(command: Option<NetworthCommands>, date: Option<&str>, json: bool) -> Result<()> {
    match command {
        None => show_breakdown(date, json),
        Some(NetworthCommands::Timeline {
            start,
            end,
            interval,
        }) => show_timeline(start.as_deref(), end.as_deref(), &interval, json),
        Some(NetworthCommands::Summary { start, end }) => {
            show_summary(start.as_deref(), end.as_deref(), json)
        }
    }
}

/// Resolve `--start`/`--end`, defaulting to the trailing year
fn period(start: Option<&str>, end: Option<&str>) -> Result<(chrono::NaiveDate, chrono::NaiveDate)> {
    let end = resolve_date(end)?;
    let start = match start {
        Some(_) => resolve_date(start)?,
        None => add_months_clamped(end, -12),
    };
    Ok((start, end))
}

fn show_breakdown(date: Option<&str>, json: bool) -> Result<()> {
    let as_of = resolve_date(date)?;
    let ctx = get_context(as_of)?;
    let breakdown = ctx.net_worth_service.breakdown(as_of)?;

    if json {
        return output::json(&breakdown);
    }

    println!("{} {}", "Net Worth as of".bold(), breakdown.date);
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Account", "Type", "Balance", "Converted", "As Of"]);
    for account in &breakdown.accounts {
        table.add_row(vec![
            Cell::new(&account.name),
            Cell::new(account.classification.as_str()),
            output::money_cell(&account.balance),
            output::money_cell(&account.converted),
            Cell::new(account.as_of.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())),
        ]);
    }
    println!("{}", table);
    println!();

    println!("Assets:      {}", breakdown.assets);
    println!("Liabilities: {}", breakdown.liabilities);
    println!("{}   {}", "Net worth:".bold(), breakdown.net_worth.to_string().bold());
    Ok(())
}

fn show_timeline(start: Option<&str>, end: Option<&str>, interval: &str, json: bool) -> Result<()> {
    let (start, end) = period(start, end)?;
    let interval: TimelineInterval = interval.parse()?;
    let ctx = get_context(end)?;
    let points = ctx.net_worth_service.timeline(start, end, interval)?;

    if json {
        return output::json(&points);
    }

    println!("{} ({}, {} to {})", "Net Worth Timeline".bold(), interval, start, end);
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Net Worth", "Change", "Change %"]);
    for point in &points {
        table.add_row(vec![
            Cell::new(point.date),
            output::money_cell(&point.value),
            Cell::new(output::signed_money(&point.change)),
            Cell::new(output::signed_percent(point.percent_change)),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn show_summary(start: Option<&str>, end: Option<&str>, json: bool) -> Result<()> {
    let (start, end) = period(start, end)?;
    let ctx = get_context(end)?;
    let summary = ctx.net_worth_service.summary(start, end)?;

    if json {
        return output::json(&summary);
    }

    println!("{}", "Net Worth Summary".bold());
    println!();
    let mut table = output::create_table();
    table.add_row(vec![Cell::new(summary.start_date), output::money_cell(&summary.start_value)]);
    table.add_row(vec![Cell::new(summary.end_date), output::money_cell(&summary.end_value)]);
    println!("{}", table);
    println!(
        "Change: {} ({})",
        output::signed_money(&summary.total_change),
        output::signed_percent(summary.percent_change)
    );
    Ok(())
}
