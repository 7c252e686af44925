//! Growth command - estimate monthly net worth growth

use anyhow::Result;
use colored::Colorize;
use horizon_core::GrowthMethod;

use super::{get_context, resolve_date};
use crate::output;

pub fn run(method: &str, date: Option<&str>, json: bool) -> Result<()> {
    let method: GrowthMethod = method.parse()?;
    let as_of = resolve_date(date)?;
    let ctx = get_context(as_of)?;
    let growth = ctx.growth_service.calculate(as_of, method)?;

    if json {
        return output::json(&growth);
    }

    println!("{} ({}, as of {})", "Monthly Growth".bold(), growth.method, as_of);
    println!();

    if let Some(issue) = &growth.issue {
        output::warning(&issue.message);
        println!("Months with data: {}", growth.data_points_used);
        return Ok(());
    }

    let mut table = output::create_table();
    table.add_row(vec!["Monthly rate".to_string(), output::signed_money(&growth.monthly_rate)]);
    table.add_row(vec!["Monthly rate %".to_string(), output::signed_percent(growth.monthly_rate_percent)]);
    table.add_row(vec!["Volatility".to_string(), growth.volatility.as_str().to_string()]);
    table.add_row(vec!["Months used".to_string(), growth.data_points_used.to_string()]);
    println!("{}", table);

    for warning in &growth.warnings {
        output::warning(&format!("! {}", warning));
    }
    Ok(())
}
