//! Net worth projection models

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::growth::GrowthRateResult;
use super::money::Money;
use super::result::{Error, Result};

/// Named growth assumption applied to the base monthly rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Conservative,
    Realistic,
    Optimistic,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Self::Conservative, Self::Realistic, Self::Optimistic];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Realistic => "realistic",
            Self::Optimistic => "optimistic",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spacing of projected points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionInterval {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl ProjectionInterval {
    pub const fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Yearly => 12,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl FromStr for ProjectionInterval {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(Error::invalid_argument(format!(
                "unknown projection interval '{}', expected monthly, quarterly or yearly",
                value
            ))),
        }
    }
}

/// A dated projected value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub date: NaiveDate,
    pub months_elapsed: u32,
    pub value: Money,
}

/// Projected value at a requested horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub date: NaiveDate,
    pub value: Money,
    pub growth_from_current: Money,
}

/// One scenario's projected series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub monthly_rate: Money,
    pub series: Vec<ProjectedPoint>,
    /// Keyed by horizon in years
    pub milestones: BTreeMap<u32, Milestone>,
    pub final_value: Money,
    pub total_growth: Money,
}

/// Multi-scenario forecast; `scenarios` is empty when growth data is insufficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub as_of: NaiveDate,
    pub current_value: Money,
    pub growth_rate: GrowthRateResult,
    pub scenarios: BTreeMap<Scenario, ScenarioProjection>,
    pub timeframes_years: Vec<u32>,
}

impl ProjectionResult {
    pub fn has_scenarios(&self) -> bool {
        !self.scenarios.is_empty()
    }

    pub fn scenario(&self, scenario: Scenario) -> Option<&ScenarioProjection> {
        self.scenarios.get(&scenario)
    }
}
