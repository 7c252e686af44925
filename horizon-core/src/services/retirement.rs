//! Retirement calculator - compound growth and retirement sufficiency

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use tracing::{debug, info};

use crate::config::RetirementSettings;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Money, Recommendation, RecommendationKind, RetirementInputs, RetirementProjectionResult,
    RetirementScenario, TrajectoryPoint,
};

const MONTHS_PER_YEAR: u32 = 12;

/// Pure retirement projection over validated inputs
#[derive(Debug, Clone, Default)]
pub struct RetirementCalculator {
    settings: RetirementSettings,
}

impl RetirementCalculator {
    pub fn new(settings: RetirementSettings) -> Self {
        Self { settings }
    }

    pub fn calculate(&self, inputs: &RetirementInputs) -> Result<RetirementProjectionResult> {
        let currency = inputs.currency();
        let years = inputs.years_until_retirement();
        let months = years * MONTHS_PER_YEAR;
        let monthly_rate = inputs.annual_return_rate() / Decimal::ONE_HUNDRED / Decimal::from(MONTHS_PER_YEAR);

        let present = inputs.current_savings().to_decimal();
        let contribution = inputs.monthly_contribution().to_decimal();

        let projected = future_value(present, contribution, monthly_rate, months)?;
        let projected_savings = Money::from_decimal(projected, currency)?;
        let contributed = checked(contribution.checked_mul(Decimal::from(months)), "contributions")?;
        let total_contributions =
            Money::from_decimal(checked(present.checked_add(contributed), "contributions")?, currency)?;

        let inflation = compound_factor(inputs.inflation_rate() / Decimal::ONE_HUNDRED, years)?;
        let annual_expenses = checked(
            inputs
                .retirement_monthly_expenses()
                .to_decimal()
                .checked_mul(Decimal::from(MONTHS_PER_YEAR)),
            "annual expenses",
        )?;
        let annual_expenses_at_retirement = Money::from_decimal(
            checked(annual_expenses.checked_mul(inflation), "inflated expenses")?,
            currency,
        )?;
        let needed_savings = annual_expenses_at_retirement.scale(self.settings.savings_multiplier)?;

        let monthly_retirement_income = Money::from_decimal(
            checked(
                projected
                    .checked_mul(self.settings.safe_withdrawal_rate)
                    .and_then(|annual| annual.checked_div(Decimal::from(MONTHS_PER_YEAR))),
                "retirement income",
            )?,
            currency,
        )?;

        let gap = projected_savings.checked_sub(&needed_savings)?;
        let is_on_track = !gap.is_negative();
        let gap_percent = gap.ratio_percent(&needed_savings)?;

        let trajectory = trajectory(inputs)?;
        let recommendations = self.recommendations(inputs, &gap, monthly_rate, months)?;

        debug!(
            years,
            projected = %projected_savings,
            needed = %needed_savings,
            "computed retirement projection"
        );

        Ok(RetirementProjectionResult {
            years_until_retirement: years,
            years_in_retirement: inputs.years_in_retirement(),
            projected_savings,
            total_contributions,
            annual_expenses_at_retirement,
            needed_savings,
            monthly_retirement_income,
            gap,
            gap_percent,
            is_on_track,
            trajectory,
            recommendations,
        })
    }

    /// The same projection under each preset return/inflation assumption
    pub fn scenarios(
        &self,
        inputs: &RetirementInputs,
    ) -> Result<BTreeMap<RetirementScenario, RetirementProjectionResult>> {
        let mut results = BTreeMap::new();
        for scenario in RetirementScenario::ALL {
            let (annual_return, inflation) = scenario.assumptions();
            let adjusted = inputs.with_rates(annual_return, inflation)?;
            results.insert(scenario, self.calculate(&adjusted)?);
        }
        info!(scenarios = results.len(), "computed retirement scenarios");
        Ok(results)
    }

    fn recommendations(
        &self,
        inputs: &RetirementInputs,
        gap: &Money,
        monthly_rate: Decimal,
        months: u32,
    ) -> Result<Vec<Recommendation>> {
        let age = inputs.retirement_age();
        let mut recommendations = Vec::new();

        if !gap.is_negative() {
            recommendations.push(Recommendation {
                kind: RecommendationKind::OnTrack,
                message: format!("You are on track to retire at {}.", age),
                amount: None,
                years: None,
            });
            if !gap.is_zero() {
                recommendations.push(Recommendation {
                    kind: RecommendationKind::Surplus,
                    message: format!(
                        "You are projected to have {} more than you need. You could retire earlier or plan for a more comfortable lifestyle.",
                        gap
                    ),
                    amount: Some(gap.clone()),
                    years: None,
                });
            }
            return Ok(recommendations);
        }

        let shortfall = gap.abs();
        recommendations.push(Recommendation {
            kind: RecommendationKind::Shortfall,
            message: format!("You are projected to be {} short at age {}.", shortfall, age),
            amount: Some(shortfall.clone()),
            years: None,
        });

        let extra = Money::from_decimal(
            required_payment(shortfall.to_decimal(), monthly_rate, months)?,
            &shortfall.currency,
        )?;
        recommendations.push(Recommendation {
            kind: RecommendationKind::IncreaseContribution,
            message: format!(
                "Saving an additional {} per month would close the gap.",
                extra
            ),
            amount: Some(extra),
            years: None,
        });

        let annual_contribution = checked(
            inputs
                .monthly_contribution()
                .to_decimal()
                .checked_mul(Decimal::from(MONTHS_PER_YEAR)),
            "annual contribution",
        )?;
        if annual_contribution > Decimal::ZERO {
            let needed_years = checked(shortfall.to_decimal().checked_div(annual_contribution), "extra years")?.ceil();
            let years = needed_years
                .to_u32()
                .unwrap_or(u32::MAX)
                .min(self.settings.max_extra_working_years)
                .max(1);
            recommendations.push(Recommendation {
                kind: RecommendationKind::WorkLonger,
                message: format!(
                    "Working {} more year{} would also help close the gap.",
                    years,
                    if years == 1 { "" } else { "s" }
                ),
                amount: None,
                years: Some(years),
            });
        }

        Ok(recommendations)
    }
}

/// Future value of a balance plus end-of-month contributions
///
/// `PV(1+r)^n + C((1+r)^n - 1)/r`, or `PV + C*n` when `r` is zero.
pub fn future_value(
    present: Decimal,
    monthly_contribution: Decimal,
    monthly_rate: Decimal,
    months: u32,
) -> Result<Decimal> {
    let months_decimal = Decimal::from(months);
    if monthly_rate.is_zero() {
        let contributions = checked(monthly_contribution.checked_mul(months_decimal), "contributions")?;
        return checked(present.checked_add(contributions), "future value");
    }

    let growth = compound_factor(monthly_rate, months)?;
    let grown = checked(present.checked_mul(growth), "future value")?;
    let annuity = checked(
        growth
            .checked_sub(Decimal::ONE)
            .and_then(|gain| gain.checked_div(monthly_rate))
            .and_then(|factor| monthly_contribution.checked_mul(factor)),
        "future value",
    )?;
    checked(grown.checked_add(annuity), "future value")
}

/// Monthly payment whose future value over `months` equals `target`
pub fn required_payment(target: Decimal, monthly_rate: Decimal, months: u32) -> Result<Decimal> {
    if months == 0 {
        return Err(Error::invalid_argument("cannot spread a payment over zero months"));
    }
    let growth = compound_factor(monthly_rate, months)?;
    let denominator = checked(growth.checked_sub(Decimal::ONE), "required payment")?;
    if monthly_rate.is_zero() || denominator.is_zero() {
        return checked(target.checked_div(Decimal::from(months)), "required payment");
    }
    checked(
        target
            .checked_mul(monthly_rate)
            .and_then(|scaled| scaled.checked_div(denominator)),
        "required payment",
    )
}

/// `(1 + rate)^periods`
fn compound_factor(rate: Decimal, periods: u32) -> Result<Decimal> {
    checked(
        Decimal::ONE
            .checked_add(rate)
            .and_then(|base| base.checked_powi(i64::from(periods))),
        "compound growth",
    )
}

fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal> {
    value.ok_or_else(|| Error::calculation(format!("{} overflowed", what)))
}

/// Year-end balances from today to retirement, compounding annually
fn trajectory(inputs: &RetirementInputs) -> Result<Vec<TrajectoryPoint>> {
    let currency = inputs.currency();
    let annual_rate = inputs.annual_return_rate() / Decimal::ONE_HUNDRED;
    let annual_contribution = checked(
        inputs
            .monthly_contribution()
            .to_decimal()
            .checked_mul(Decimal::from(MONTHS_PER_YEAR)),
        "trajectory",
    )?;

    let mut balance = inputs.current_savings().to_decimal();
    let mut contributed = balance;
    let mut points = Vec::with_capacity(inputs.years_until_retirement() as usize + 1);

    for year in 0..=inputs.years_until_retirement() {
        if year > 0 {
            let grown = checked(balance.checked_mul(Decimal::ONE + annual_rate), "trajectory")?;
            balance = checked(grown.checked_add(annual_contribution), "trajectory")?;
            contributed = checked(contributed.checked_add(annual_contribution), "trajectory")?;
        }
        points.push(TrajectoryPoint {
            age: inputs.current_age() + year,
            year,
            balance: Money::from_decimal(balance, currency)?,
            total_contributed: Money::from_decimal(contributed, currency)?,
        });
    }
    Ok(points)
}
