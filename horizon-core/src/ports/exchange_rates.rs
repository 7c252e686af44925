//! Exchange rate port

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::result::Result;

/// Currency rate lookup
///
/// Rates convert one unit of `from` into `to`.
pub trait ExchangeRateProvider: Send + Sync {
    /// Rate effective on `date`, `None` when no rate was recorded for it
    fn rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<Option<Decimal>>;

    /// Most recent rate known regardless of date
    fn latest_rate(&self, from: &str, to: &str) -> Result<Option<Decimal>>;
}
