//! Retire command - retirement savings projection

use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::Cell;
use horizon_core::adapters::csv_source;
use horizon_core::config::Config;
use horizon_core::domain::{RecommendationKind, RetirementProjectionResult};
use horizon_core::services::RetirementCalculator;
use horizon_core::{Money, RetirementInputs};
use rust_decimal::Decimal;

use super::get_horizon_dir;
use crate::output;

#[derive(Args)]
pub struct RetireArgs {
    /// Current age in years
    #[arg(long)]
    age: u32,
    /// Age at retirement
    #[arg(long, default_value_t = 65)]
    retire_at: u32,
    /// Current retirement savings
    #[arg(long, default_value = "0")]
    savings: String,
    /// Monthly contribution until retirement
    #[arg(long, default_value = "0")]
    monthly: String,
    /// Expected annual return, in percent
    #[arg(long = "return", default_value = "7")]
    annual_return: String,
    /// Monthly expenses in retirement, in today's money
    #[arg(long)]
    expenses: String,
    /// Life expectancy in years
    #[arg(long, default_value_t = 90)]
    life_expectancy: u32,
    /// Expected annual inflation, in percent
    #[arg(long, default_value = "3")]
    inflation: String,
    /// Currency of the amounts (defaults to the reporting currency)
    #[arg(long)]
    currency: Option<String>,
    /// Compare conservative, moderate and aggressive assumptions
    #[arg(long)]
    scenarios: bool,
}

fn amount(raw: &str, flag: &str) -> Result<Decimal> {
    csv_source::parse_amount(raw).ok_or_else(|| anyhow!("Invalid value '{}' for --{}", raw, flag))
}

pub fn run(args: RetireArgs, json: bool) -> Result<()> {
    let config = Config::load(&get_horizon_dir()?)?;
    let currency = args
        .currency
        .clone()
        .unwrap_or_else(|| config.reporting_currency.clone());

    let inputs = RetirementInputs::new(
        args.age,
        args.retire_at,
        Money::from_decimal(amount(&args.savings, "savings")?, &currency)?,
        Money::from_decimal(amount(&args.monthly, "monthly")?, &currency)?,
        amount(&args.annual_return, "return")?,
        Money::from_decimal(amount(&args.expenses, "expenses")?, &currency)?,
        args.life_expectancy,
        amount(&args.inflation, "inflation")?,
    )?;
    let calculator = RetirementCalculator::new(config.retirement);

    if args.scenarios {
        let results = calculator.scenarios(&inputs)?;
        if json {
            return output::json(&results);
        }

        println!("{}", "Retirement Scenarios".bold());
        println!();
        let mut table = output::create_table();
        table.set_header(vec!["Scenario", "Projected", "Needed", "Gap", "On Track"]);
        for (scenario, result) in &results {
            table.add_row(vec![
                Cell::new(scenario),
                output::money_cell(&result.projected_savings),
                output::money_cell(&result.needed_savings),
                output::money_cell(&result.gap),
                Cell::new(if result.is_on_track { "yes" } else { "no" }),
            ]);
        }
        println!("{}", table);
        return Ok(());
    }

    let result = calculator.calculate(&inputs)?;
    if json {
        return output::json(&result);
    }
    print_result(&result);
    Ok(())
}

fn print_result(result: &RetirementProjectionResult) {
    println!("{}", "Retirement Projection".bold());
    println!();

    let mut table = output::create_table();
    let rows = [
        ("Years until retirement", result.years_until_retirement.to_string()),
        ("Years in retirement", result.years_in_retirement.to_string()),
        ("Projected savings", result.projected_savings.to_string()),
        ("Total contributions", result.total_contributions.to_string()),
        ("Annual expenses at retirement", result.annual_expenses_at_retirement.to_string()),
        ("Savings needed", result.needed_savings.to_string()),
        ("Monthly retirement income", result.monthly_retirement_income.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }
    table.add_row(vec![
        "Gap".to_string(),
        format!(
            "{} ({})",
            output::signed_money(&result.gap),
            output::signed_percent(result.gap_percent)
        ),
    ]);
    println!("{}", table);
    println!();

    for recommendation in &result.recommendations {
        match recommendation.kind {
            RecommendationKind::OnTrack | RecommendationKind::Surplus => {
                output::success(&recommendation.message)
            }
            RecommendationKind::Shortfall => output::warning(&recommendation.message),
            RecommendationKind::IncreaseContribution | RecommendationKind::WorkLonger => {
                output::info(&format!("- {}", recommendation.message))
            }
        }
    }
}
