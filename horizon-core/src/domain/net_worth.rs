//! Net worth time series models

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::Classification;
use super::money::Money;
use super::result::{Error, Result};
use crate::calendar::{add_months_clamped, end_of_month, end_of_quarter, end_of_year};

/// Spacing between points of a net worth timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineInterval {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl TimelineInterval {
    pub const ALL: [TimelineInterval; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Yearly,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// The date following `current` in this interval
    ///
    /// Calendar intervals snap to the end of the next period, so a series
    /// started mid-month continues on month ends.
    pub fn advance(self, current: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => current + Duration::days(1),
            Self::Weekly => current + Duration::days(7),
            Self::Monthly => end_of_month(add_months_clamped(end_of_month(current), 1)),
            Self::Quarterly => end_of_quarter(add_months_clamped(end_of_quarter(current), 1)),
            Self::Yearly => end_of_year(add_months_clamped(end_of_year(current), 1)),
        }
    }

    /// Every date from `start` to `end` inclusive; the last point is always `end`
    pub fn dates_between(self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        if start > end {
            return Err(Error::invalid_argument(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        let mut dates = vec![start];
        let mut current = start;
        while current < end {
            current = self.advance(current).min(end);
            if dates.last() != Some(&current) {
                dates.push(current);
            }
        }
        Ok(dates)
    }
}

impl FromStr for TimelineInterval {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_str() == normalized)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "unknown interval '{}', expected one of: daily, weekly, monthly, quarterly, yearly",
                    value
                ))
            })
    }
}

impl fmt::Display for TimelineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point of a family-level net worth series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSample {
    pub date: NaiveDate,
    pub value: Money,
    /// Number of accounts with a recorded balance at or before `date`
    pub accounts_with_data: usize,
}

impl NetWorthSample {
    pub fn has_data(&self) -> bool {
        self.accounts_with_data > 0
    }
}

/// A timeline point with its change from the previous point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub value: Money,
    pub change: Money,
    pub percent_change: f64,
}

/// Start/end comparison over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_value: Money,
    pub end_value: Money,
    pub total_change: Money,
    pub percent_change: f64,
}

/// One account's share of a net worth figure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountContribution {
    pub account_id: Uuid,
    pub name: String,
    pub classification: Classification,
    /// Carried-forward balance in the account's own currency
    pub balance: Money,
    /// The same balance in the reporting currency
    pub converted: Money,
    /// Date of the balance point used, if any
    pub as_of: Option<NaiveDate>,
}

/// Net worth split into assets and liabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetWorthBreakdown {
    pub date: NaiveDate,
    pub assets: Money,
    pub liabilities: Money,
    pub net_worth: Money,
    pub accounts: Vec<AccountContribution>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!("Monthly".parse::<TimelineInterval>().unwrap(), TimelineInterval::Monthly);
        let err = "fortnightly".parse::<TimelineInterval>().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_daily_and_weekly_steps() {
        let days = TimelineInterval::Daily
            .dates_between(date(2024, 1, 1), date(2024, 1, 3))
            .unwrap();
        assert_eq!(days, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);

        let weeks = TimelineInterval::Weekly
            .dates_between(date(2024, 1, 1), date(2024, 1, 20))
            .unwrap();
        assert_eq!(
            weeks,
            vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15), date(2024, 1, 20)]
        );
    }

    #[test]
    fn test_monthly_snaps_to_month_ends_and_clamps() {
        let months = TimelineInterval::Monthly
            .dates_between(date(2024, 1, 15), date(2024, 4, 10))
            .unwrap();
        assert_eq!(
            months,
            vec![
                date(2024, 1, 15),
                date(2024, 2, 29),
                date(2024, 3, 31),
                date(2024, 4, 10)
            ]
        );
    }

    #[test]
    fn test_period_end_collision_is_deduplicated() {
        let quarters = TimelineInterval::Quarterly
            .dates_between(date(2024, 3, 31), date(2024, 9, 30))
            .unwrap();
        assert_eq!(quarters, vec![date(2024, 3, 31), date(2024, 6, 30), date(2024, 9, 30)]);

        let years = TimelineInterval::Yearly
            .dates_between(date(2023, 6, 1), date(2024, 12, 31))
            .unwrap();
        assert_eq!(years, vec![date(2023, 6, 1), date(2023, 12, 31), date(2024, 12, 31)]);
    }

    #[test]
    fn test_single_day_range() {
        let dates = TimelineInterval::Monthly
            .dates_between(date(2024, 5, 5), date(2024, 5, 5))
            .unwrap();
        assert_eq!(dates, vec![date(2024, 5, 5)]);
    }

    #[test]
    fn test_reversed_range_is_invalid() {
        let err = TimelineInterval::Daily
            .dates_between(date(2024, 2, 1), date(2024, 1, 1))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
