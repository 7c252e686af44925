//! Net worth service - family net worth at a date and over time

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::balance::latest_at_or_before;
use crate::domain::money::normalize_currency;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountContribution, BalancePoint, Money, NetWorthBreakdown, NetWorthSample,
    NetWorthSummary, TimelineInterval, TimelinePoint,
};
use crate::ports::{BalanceStore, ExchangeRateProvider};

/// Net worth calculator over a balance store
///
/// Net worth is the sum of visible asset balances minus visible liability
/// balances, each account's latest point carried forward and converted into
/// the reporting currency.
pub struct NetWorthService {
    balances: Arc<dyn BalanceStore>,
    rates: Arc<dyn ExchangeRateProvider>,
    reporting_currency: String,
}

/// Visible accounts with their balance history, loaded once per request
struct Ledger {
    entries: Vec<(Account, Vec<BalancePoint>)>,
}

impl NetWorthService {
    pub fn new(
        balances: Arc<dyn BalanceStore>,
        rates: Arc<dyn ExchangeRateProvider>,
        reporting_currency: &str,
    ) -> Self {
        Self {
            balances,
            rates,
            reporting_currency: normalize_currency(reporting_currency),
        }
    }

    pub fn reporting_currency(&self) -> &str {
        &self.reporting_currency
    }

    /// Net worth on `date`; zero when no account has data yet
    pub fn calculate(&self, date: NaiveDate) -> Result<Money> {
        Ok(self.sample(date)?.value)
    }

    /// Net worth on `date` with the number of accounts that contributed
    pub fn sample(&self, date: NaiveDate) -> Result<NetWorthSample> {
        let ledger = self.load(date)?;
        self.sample_from(&ledger, date)
    }

    /// Samples for several dates, reading balances only once
    pub fn samples(&self, dates: &[NaiveDate]) -> Result<Vec<NetWorthSample>> {
        let Some(last) = dates.iter().max() else {
            return Ok(Vec::new());
        };
        let ledger = self.load(*last)?;
        dates
            .iter()
            .map(|date| self.sample_from(&ledger, *date))
            .collect()
    }

    /// Per-account view of net worth on `date`
    pub fn breakdown(&self, date: NaiveDate) -> Result<NetWorthBreakdown> {
        let ledger = self.load(date)?;

        let mut assets = Money::zero(&self.reporting_currency);
        let mut liabilities = Money::zero(&self.reporting_currency);
        let mut accounts = Vec::with_capacity(ledger.entries.len());

        for (account, points) in &ledger.entries {
            let latest = latest_at_or_before(points, date);
            let balance = latest
                .map(|p| p.amount.clone())
                .unwrap_or_else(|| Money::zero(&account.currency));
            let converted = self.to_reporting(&balance, date)?;

            if account.is_liability() {
                liabilities = liabilities.checked_add(&converted)?;
            } else {
                assets = assets.checked_add(&converted)?;
            }

            accounts.push(AccountContribution {
                account_id: account.id,
                name: account.name.clone(),
                classification: account.classification,
                balance,
                converted,
                as_of: latest.map(|p| p.date),
            });
        }

        let net_worth = assets.checked_sub(&liabilities)?;
        Ok(NetWorthBreakdown {
            date,
            assets,
            liabilities,
            net_worth,
            accounts,
        })
    }

    /// Net worth from `start` to `end` at `interval` spacing
    ///
    /// The first point has zero change; each later point reports the change
    /// and percent change from the point before it.
    pub fn timeline(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        interval: TimelineInterval,
    ) -> Result<Vec<TimelinePoint>> {
        let dates = interval.dates_between(start, end)?;
        let samples = self.samples(&dates)?;

        let mut points: Vec<TimelinePoint> = Vec::with_capacity(samples.len());
        for sample in samples {
            let (change, percent_change) = match points.last() {
                Some(previous) => {
                    let change = sample.value.checked_sub(&previous.value)?;
                    let percent = change.ratio_percent(&previous.value)?;
                    (change, percent)
                }
                None => (Money::zero(&self.reporting_currency), 0.0),
            };
            points.push(TimelinePoint {
                date: sample.date,
                value: sample.value,
                change,
                percent_change,
            });
        }

        debug!(%start, %end, interval = interval.as_str(), points = points.len(), "built net worth timeline");
        Ok(points)
    }

    /// Net worth change between two dates
    pub fn summary(&self, start: NaiveDate, end: NaiveDate) -> Result<NetWorthSummary> {
        if start > end {
            return Err(Error::invalid_argument(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        let samples = self.samples(&[start, end])?;
        let (start_value, end_value) = match samples.as_slice() {
            [first, last] => (first.value.clone(), last.value.clone()),
            _ => return Err(Error::calculation("expected two net worth samples")),
        };
        let total_change = end_value.checked_sub(&start_value)?;
        let percent_change = total_change.ratio_percent(&start_value)?;

        Ok(NetWorthSummary {
            start_date: start,
            end_date: end,
            start_value,
            end_value,
            total_change,
            percent_change,
        })
    }

    fn load(&self, up_to: NaiveDate) -> Result<Ledger> {
        let accounts = self.balances.accounts()?;
        let mut entries = Vec::with_capacity(accounts.len());
        for account in accounts.into_iter().filter(|a| a.visible) {
            let points = self.balances.balance_points(account.id, up_to)?;
            entries.push((account, points));
        }
        Ok(Ledger { entries })
    }

    fn sample_from(&self, ledger: &Ledger, date: NaiveDate) -> Result<NetWorthSample> {
        let mut value = Money::zero(&self.reporting_currency);
        let mut accounts_with_data = 0;

        for (account, points) in &ledger.entries {
            let Some(point) = latest_at_or_before(points, date) else {
                continue;
            };
            accounts_with_data += 1;

            let converted = self.to_reporting(&point.amount, date)?;
            value = if account.is_liability() {
                value.checked_sub(&converted)?
            } else {
                value.checked_add(&converted)?
            };
        }

        Ok(NetWorthSample {
            date,
            value,
            accounts_with_data,
        })
    }

    /// Convert into the reporting currency, falling back to the latest known rate
    fn to_reporting(&self, amount: &Money, date: NaiveDate) -> Result<Money> {
        if amount.currency == self.reporting_currency {
            return Ok(amount.clone());
        }

        let to = self.reporting_currency.as_str();
        let rate = match self.rates.rate(&amount.currency, to, date)? {
            Some(rate) => rate,
            None => {
                let latest = self.rates.latest_rate(&amount.currency, to)?;
                let Some(rate) = latest else {
                    return Err(Error::MissingExchangeRate {
                        from: amount.currency.clone(),
                        to: to.to_string(),
                        date,
                    });
                };
                warn!(from = %amount.currency, to, %date, %rate, "no dated exchange rate, using latest");
                rate
            }
        };
        amount.convert(to, rate)
    }
}
