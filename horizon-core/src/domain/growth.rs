//! Growth rate result models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::money::Money;
use super::result::{DataIssue, Error, Result};

/// How monthly deltas are averaged into a single rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthMethod {
    #[default]
    Mean,
    /// Robust to one-off outlier months
    Median,
    /// Linear weights, most recent month heaviest
    Weighted,
}

impl GrowthMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Weighted => "weighted",
        }
    }
}

impl FromStr for GrowthMethod {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "weighted" => Ok(Self::Weighted),
            _ => Err(Error::invalid_argument(format!(
                "unknown growth method '{}', expected mean, median or weighted",
                value
            ))),
        }
    }
}

impl fmt::Display for GrowthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coefficient-of-variation bucket for monthly deltas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    #[default]
    Low,
    Medium,
    High,
}

impl Volatility {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Historical monthly growth estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRateResult {
    pub sufficient_data: bool,
    pub monthly_rate: Money,
    pub monthly_rate_percent: f64,
    pub data_points_used: usize,
    pub method: GrowthMethod,
    pub volatility: Volatility,
    pub warnings: Vec<String>,
    /// Set when `sufficient_data` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<DataIssue>,
}

impl GrowthRateResult {
    /// A result that carries no rate, only the reason why
    pub fn unavailable(
        issue: DataIssue,
        method: GrowthMethod,
        data_points_used: usize,
        currency: &str,
    ) -> Self {
        Self {
            sufficient_data: false,
            monthly_rate: Money::zero(currency),
            monthly_rate_percent: 0.0,
            data_points_used,
            method,
            volatility: Volatility::Low,
            warnings: Vec::new(),
            issue: Some(issue),
        }
    }
}
