//! Balance point domain model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Money;

/// How a balance point was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceSource {
    Sync,
    Manual,
    Import,
    Demo,
}

/// The known balance of one account on one date
///
/// Balance points are immutable once recorded. An account's latest point
/// carries forward to every later date until a newer point appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub account_id: Uuid,
    pub amount: Money,
    pub source: BalanceSource,
}

impl BalancePoint {
    pub fn new(account_id: Uuid, date: NaiveDate, amount: Money) -> Self {
        Self {
            date,
            account_id,
            amount,
            source: BalanceSource::Manual,
        }
    }

    pub fn from_import(account_id: Uuid, date: NaiveDate, amount: Money) -> Self {
        Self {
            source: BalanceSource::Import,
            ..Self::new(account_id, date, amount)
        }
    }
}

/// Pick the most recent point at or before `date` (carry-forward)
///
/// Points may arrive in any order. When two points share a date, the one
/// listed last wins.
pub fn latest_at_or_before(points: &[BalancePoint], date: NaiveDate) -> Option<&BalancePoint> {
    points
        .iter()
        .filter(|p| p.date <= date)
        .fold(None, |best: Option<&BalancePoint>, point| match best {
            Some(current) if current.date > point.date => Some(current),
            _ => Some(point),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_carry_forward_picks_latest_prior_point() {
        let account_id = Uuid::new_v4();
        let points = vec![
            BalancePoint::new(account_id, date(2024, 3, 1), Money::new(300, "USD")),
            BalancePoint::new(account_id, date(2024, 1, 1), Money::new(100, "USD")),
            BalancePoint::new(account_id, date(2024, 2, 1), Money::new(200, "USD")),
        ];

        let found = latest_at_or_before(&points, date(2024, 2, 15)).unwrap();
        assert_eq!(found.amount.amount_minor, 200);

        let exact = latest_at_or_before(&points, date(2024, 3, 1)).unwrap();
        assert_eq!(exact.amount.amount_minor, 300);

        assert!(latest_at_or_before(&points, date(2023, 12, 31)).is_none());
    }

    #[test]
    fn test_same_day_points_last_wins() {
        let account_id = Uuid::new_v4();
        let points = vec![
            BalancePoint::new(account_id, date(2024, 1, 1), Money::new(100, "USD")),
            BalancePoint::from_import(account_id, date(2024, 1, 1), Money::new(150, "USD")),
        ];
        let found = latest_at_or_before(&points, date(2024, 1, 1)).unwrap();
        assert_eq!(found.amount.amount_minor, 150);
        assert_eq!(found.source, BalanceSource::Import);
    }
}
