//! Project command - forecast net worth under three growth scenarios

use anyhow::{anyhow, Result};
use colored::Colorize;
use comfy_table::Cell;
use horizon_core::adapters::csv_source;
use horizon_core::domain::Scenario;
use horizon_core::{Money, ProjectionInterval};

use super::{get_context, resolve_date};
use crate::output;

pub fn run(
    years: &[u32],
    interval: &str,
    rate: Option<&str>,
    date: Option<&str>,
    json: bool,
) -> Result<()> {
    let interval: ProjectionInterval = interval.parse()?;
    let as_of = resolve_date(date)?;
    let ctx = get_context(as_of)?;

    let projection = match rate {
        Some(raw) => {
            let amount = csv_source::parse_amount(raw)
                .ok_or_else(|| anyhow!("Invalid rate '{}', expected an amount like 250.00", raw))?;
            let monthly_rate = Money::from_decimal(amount, &ctx.config.reporting_currency)?;
            ctx.projection_service
                .generate_with_rate(as_of, years, interval, monthly_rate)?
        }
        None => ctx.projection_service.generate(as_of, years, interval)?,
    };

    if json {
        return output::json(&projection);
    }

    println!("{} (from {})", "Net Worth Projection".bold(), as_of);
    println!("Current net worth: {}", projection.current_value.to_string().bold());

    if !projection.has_scenarios() {
        if let Some(issue) = &projection.growth_rate.issue {
            output::warning(&issue.message);
        }
        output::info("Pass --rate to project from a fixed monthly amount instead.");
        return Ok(());
    }

    println!(
        "Base growth: {}/month ({})",
        output::signed_money(&projection.growth_rate.monthly_rate),
        output::signed_percent(projection.growth_rate.monthly_rate_percent)
    );
    println!();

    let mut table = output::create_table();
    let mut header = vec!["Years".to_string()];
    header.extend(Scenario::ALL.iter().map(|s| s.to_string()));
    table.set_header(header);

    for years in &projection.timeframes_years {
        let mut row = vec![Cell::new(years)];
        for scenario in Scenario::ALL {
            let milestone = projection
                .scenario(scenario)
                .and_then(|p| p.milestones.get(years));
            row.push(match milestone {
                Some(m) => output::money_cell(&m.value),
                None => Cell::new("-"),
            });
        }
        table.add_row(row);
    }
    println!("{}", table);

    for warning in &projection.growth_rate.warnings {
        output::warning(&format!("! {}", warning));
    }
    Ok(())
}
