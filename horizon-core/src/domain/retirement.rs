//! Retirement planning inputs and results

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::Money;
use super::result::{Error, Result};

const MAX_AGE: u32 = 150;
const MAX_RATE_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Validated inputs for a retirement projection
///
/// Rates are percentages (7 means 7% per year). Construction fails on any
/// out-of-range value instead of clamping it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementInputs {
    current_age: u32,
    retirement_age: u32,
    current_savings: Money,
    monthly_contribution: Money,
    annual_return_rate: Decimal,
    retirement_monthly_expenses: Money,
    life_expectancy: u32,
    inflation_rate: Decimal,
}

impl RetirementInputs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        current_age: u32,
        retirement_age: u32,
        current_savings: Money,
        monthly_contribution: Money,
        annual_return_rate: Decimal,
        retirement_monthly_expenses: Money,
        life_expectancy: u32,
        inflation_rate: Decimal,
    ) -> Result<Self> {
        if current_age == 0 {
            return Err(Error::invalid_argument("current age must be greater than zero"));
        }
        if retirement_age <= current_age {
            return Err(Error::invalid_argument(format!(
                "retirement age ({}) must be greater than current age ({})",
                retirement_age, current_age
            )));
        }
        if life_expectancy <= retirement_age {
            return Err(Error::invalid_argument(format!(
                "life expectancy ({}) must be greater than retirement age ({})",
                life_expectancy, retirement_age
            )));
        }
        if life_expectancy > MAX_AGE {
            return Err(Error::invalid_argument(format!(
                "life expectancy ({}) must not exceed {}",
                life_expectancy, MAX_AGE
            )));
        }

        for (name, amount) in [
            ("current savings", &current_savings),
            ("monthly contribution", &monthly_contribution),
            ("retirement monthly expenses", &retirement_monthly_expenses),
        ] {
            if amount.is_negative() {
                return Err(Error::invalid_argument(format!("{} must not be negative", name)));
            }
        }
        if current_savings.currency != monthly_contribution.currency
            || current_savings.currency != retirement_monthly_expenses.currency
        {
            return Err(Error::invalid_argument(
                "savings, contribution and expenses must share one currency",
            ));
        }

        for (name, rate) in [
            ("annual return rate", annual_return_rate),
            ("inflation rate", inflation_rate),
        ] {
            if rate <= -MAX_RATE_PERCENT || rate > MAX_RATE_PERCENT {
                return Err(Error::invalid_argument(format!(
                    "{} must be above -100% and at most 100%, got {}%",
                    name, rate
                )));
            }
        }

        Ok(Self {
            current_age,
            retirement_age,
            current_savings,
            monthly_contribution,
            annual_return_rate,
            retirement_monthly_expenses,
            life_expectancy,
            inflation_rate,
        })
    }

    /// Same inputs under different return/inflation assumptions
    pub fn with_rates(&self, annual_return_rate: Decimal, inflation_rate: Decimal) -> Result<Self> {
        Self::new(
            self.current_age,
            self.retirement_age,
            self.current_savings.clone(),
            self.monthly_contribution.clone(),
            annual_return_rate,
            self.retirement_monthly_expenses.clone(),
            self.life_expectancy,
            inflation_rate,
        )
    }

    pub fn current_age(&self) -> u32 {
        self.current_age
    }

    pub fn retirement_age(&self) -> u32 {
        self.retirement_age
    }

    pub fn current_savings(&self) -> &Money {
        &self.current_savings
    }

    pub fn monthly_contribution(&self) -> &Money {
        &self.monthly_contribution
    }

    pub fn annual_return_rate(&self) -> Decimal {
        self.annual_return_rate
    }

    pub fn retirement_monthly_expenses(&self) -> &Money {
        &self.retirement_monthly_expenses
    }

    pub fn life_expectancy(&self) -> u32 {
        self.life_expectancy
    }

    pub fn inflation_rate(&self) -> Decimal {
        self.inflation_rate
    }

    pub fn currency(&self) -> &str {
        &self.current_savings.currency
    }

    pub fn years_until_retirement(&self) -> u32 {
        self.retirement_age - self.current_age
    }

    pub fn years_in_retirement(&self) -> u32 {
        self.life_expectancy - self.retirement_age
    }
}

/// Preset return/inflation assumptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetirementScenario {
    Conservative,
    Moderate,
    Aggressive,
}

impl RetirementScenario {
    pub const ALL: [RetirementScenario; 3] = [Self::Conservative, Self::Moderate, Self::Aggressive];

    /// `(annual return %, inflation %)`
    pub fn assumptions(self) -> (Decimal, Decimal) {
        match self {
            Self::Conservative => (Decimal::new(4, 0), Decimal::new(3, 0)),
            Self::Moderate => (Decimal::new(7, 0), Decimal::new(25, 1)),
            Self::Aggressive => (Decimal::new(10, 0), Decimal::new(2, 0)),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RetirementScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Balance at the end of one year of saving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub age: u32,
    pub year: u32,
    pub balance: Money,
    /// Starting savings plus contributions, no growth
    pub total_contributed: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    OnTrack,
    Surplus,
    Shortfall,
    IncreaseContribution,
    WorkLonger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementProjectionResult {
    pub years_until_retirement: u32,
    pub years_in_retirement: u32,
    pub projected_savings: Money,
    pub total_contributions: Money,
    /// Annual expenses in retirement-date money
    pub annual_expenses_at_retirement: Money,
    pub needed_savings: Money,
    pub monthly_retirement_income: Money,
    pub gap: Money,
    pub gap_percent: f64,
    pub is_on_track: bool,
    pub trajectory: Vec<TrajectoryPoint>,
    pub recommendations: Vec<Recommendation>,
}
