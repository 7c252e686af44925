//! Projection service - multi-scenario net worth forecasts

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::growth_rate::GrowthRateService;
use super::net_worth::NetWorthService;
use crate::calendar::add_months_clamped;
use crate::config::ProjectionSettings;
use crate::domain::result::{Error, Result};
use crate::domain::{
    GrowthMethod, GrowthRateResult, Milestone, Money, ProjectedPoint, ProjectionInterval,
    ProjectionResult, Scenario, ScenarioProjection, Volatility,
};

/// Forecasts net worth under conservative, realistic and optimistic growth
pub struct ProjectionService {
    net_worth: Arc<NetWorthService>,
    growth: Arc<GrowthRateService>,
    settings: ProjectionSettings,
}

impl ProjectionService {
    pub fn new(
        net_worth: Arc<NetWorthService>,
        growth: Arc<GrowthRateService>,
        settings: ProjectionSettings,
    ) -> Self {
        Self {
            net_worth,
            growth,
            settings,
        }
    }

    /// Project from the historical mean growth rate
    ///
    /// Returns a result with no scenarios when the history is too short or
    /// too sparse to estimate growth.
    pub fn generate(
        &self,
        as_of: NaiveDate,
        timeframes_years: &[u32],
        interval: ProjectionInterval,
    ) -> Result<ProjectionResult> {
        let timeframes = self.validate_timeframes(timeframes_years)?;
        let growth_rate = self.growth.calculate(as_of, GrowthMethod::Mean)?;
        let current_value = self.net_worth.calculate(as_of)?;

        if !growth_rate.sufficient_data {
            info!(%as_of, "skipping projection, growth history unavailable");
            return Ok(ProjectionResult {
                as_of,
                current_value,
                growth_rate,
                scenarios: BTreeMap::new(),
                timeframes_years: timeframes,
            });
        }

        project(&current_value, growth_rate, as_of, &timeframes, interval, &self.settings)
    }

    /// Project from a caller-supplied monthly rate instead of history
    pub fn generate_with_rate(
        &self,
        as_of: NaiveDate,
        timeframes_years: &[u32],
        interval: ProjectionInterval,
        monthly_rate: Money,
    ) -> Result<ProjectionResult> {
        let timeframes = self.validate_timeframes(timeframes_years)?;
        let current_value = self.net_worth.calculate(as_of)?;
        let growth_rate = GrowthRateResult {
            sufficient_data: true,
            monthly_rate_percent: monthly_rate.ratio_percent(&current_value)?,
            monthly_rate,
            data_points_used: 0,
            method: GrowthMethod::Mean,
            volatility: Volatility::Low,
            warnings: Vec::new(),
            issue: None,
        };

        project(&current_value, growth_rate, as_of, &timeframes, interval, &self.settings)
    }

    /// Sorted, deduplicated timeframes, or an error naming the disallowed ones
    pub fn validate_timeframes(&self, timeframes_years: &[u32]) -> Result<Vec<u32>> {
        validate_timeframes(timeframes_years, &self.settings.allowed_timeframes)
    }
}

pub fn validate_timeframes(timeframes_years: &[u32], allowed: &[u32]) -> Result<Vec<u32>> {
    if timeframes_years.is_empty() {
        return Err(Error::invalid_argument("at least one timeframe is required"));
    }

    let invalid: Vec<String> = timeframes_years
        .iter()
        .filter(|years| !allowed.contains(years))
        .map(|years| years.to_string())
        .collect();
    if !invalid.is_empty() {
        let allowed: Vec<String> = allowed.iter().map(|y| y.to_string()).collect();
        return Err(Error::invalid_argument(format!(
            "invalid timeframes: {} (allowed: {})",
            invalid.join(", "),
            allowed.join(", ")
        )));
    }

    let mut timeframes = timeframes_years.to_vec();
    timeframes.sort_unstable();
    timeframes.dedup();
    Ok(timeframes)
}

/// Linear projection of `current_value` for each scenario
///
/// `timeframes_years` must already be validated and sorted.
pub fn project(
    current_value: &Money,
    growth_rate: GrowthRateResult,
    as_of: NaiveDate,
    timeframes_years: &[u32],
    interval: ProjectionInterval,
    settings: &ProjectionSettings,
) -> Result<ProjectionResult> {
    let max_years = timeframes_years
        .iter()
        .copied()
        .max()
        .ok_or_else(|| Error::invalid_argument("at least one timeframe is required"))?;
    let horizon_months = max_years
        .checked_mul(12)
        .ok_or_else(|| Error::invalid_argument(format!("timeframe of {} years is too long", max_years)))?;

    let base_rate = growth_rate.monthly_rate.to_decimal();
    let mut scenarios = BTreeMap::new();
    for scenario in Scenario::ALL {
        let monthly_rate = base_rate
            .checked_mul(multiplier(scenario, settings))
            .ok_or_else(|| Error::calculation("scenario growth rate overflowed"))?;
        let projection = project_scenario(
            current_value,
            monthly_rate,
            as_of,
            horizon_months,
            interval,
            timeframes_years,
        )?;
        debug!(
            scenario = scenario.as_str(),
            final_value = %projection.final_value,
            "projected scenario"
        );
        scenarios.insert(scenario, projection);
    }

    info!(%as_of, years = max_years, interval = interval.as_str(), "generated net worth projection");
    Ok(ProjectionResult {
        as_of,
        current_value: current_value.clone(),
        growth_rate,
        scenarios,
        timeframes_years: timeframes_years.to_vec(),
    })
}

fn multiplier(scenario: Scenario, settings: &ProjectionSettings) -> Decimal {
    match scenario {
        Scenario::Conservative => settings.conservative_multiplier,
        Scenario::Realistic => settings.realistic_multiplier,
        Scenario::Optimistic => settings.optimistic_multiplier,
    }
}

/// Values are computed from the unrounded scenario rate and rounded once per point
fn project_scenario(
    current_value: &Money,
    monthly_rate: Decimal,
    as_of: NaiveDate,
    horizon_months: u32,
    interval: ProjectionInterval,
    timeframes_years: &[u32],
) -> Result<ScenarioProjection> {
    let currency = &current_value.currency;
    let start = current_value.to_decimal();
    let mut series = Vec::new();
    let mut months_elapsed = 0u32;
    loop {
        let value = monthly_rate
            .checked_mul(Decimal::from(months_elapsed))
            .and_then(|growth| start.checked_add(growth))
            .ok_or_else(|| Error::calculation("projected value overflowed"))?;
        series.push(ProjectedPoint {
            date: add_months_clamped(as_of, months_elapsed as i32),
            months_elapsed,
            value: Money::from_decimal(value, currency)?,
        });
        if months_elapsed >= horizon_months {
            break;
        }
        months_elapsed = (months_elapsed + interval.months()).min(horizon_months);
    }

    let mut milestones = BTreeMap::new();
    for years in timeframes_years {
        let target = add_months_clamped(as_of, (*years * 12) as i32);
        // earliest point wins a tie
        let Some(point) = series
            .iter()
            .min_by_key(|p| (p.date - target).num_days().abs())
        else {
            continue;
        };
        milestones.insert(
            *years,
            Milestone {
                date: point.date,
                value: point.value.clone(),
                growth_from_current: point.value.checked_sub(current_value)?,
            },
        );
    }

    let final_value = series
        .last()
        .map(|p| p.value.clone())
        .unwrap_or_else(|| current_value.clone());
    let total_growth = final_value.checked_sub(current_value)?;

    Ok(ScenarioProjection {
        monthly_rate: Money::from_decimal(monthly_rate, currency)?,
        series,
        milestones,
        final_value,
        total_growth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryBalanceStore, StaticExchangeRates};
    use crate::config::GrowthSettings;
    use crate::domain::{Account, BalancePoint, DataIssue, DataIssueCode};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn usd(major: i64) -> Money {
        Money::new(major * 100, "USD")
    }

    fn growth(monthly_rate: Money) -> GrowthRateResult {
        GrowthRateResult {
            sufficient_data: true,
            monthly_rate,
            monthly_rate_percent: 0.0,
            data_points_used: 6,
            method: GrowthMethod::Mean,
            volatility: Volatility::Low,
            warnings: Vec::new(),
            issue: None,
        }
    }

    fn run(rate: Money, timeframes: &[u32], interval: ProjectionInterval) -> ProjectionResult {
        project(
            &usd(10_000),
            growth(rate),
            date(2024, 1, 31),
            timeframes,
            interval,
            &ProjectionSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_linear_scenarios() {
        let result = run(usd(500), &[1], ProjectionInterval::Monthly);
        let realistic = result.scenario(Scenario::Realistic).unwrap();
        let conservative = result.scenario(Scenario::Conservative).unwrap();
        let optimistic = result.scenario(Scenario::Optimistic).unwrap();

        assert_eq!(realistic.series.len(), 13);
        assert_eq!(realistic.series[0].value, usd(10_000));
        assert_eq!(realistic.final_value, usd(16_000));
        assert_eq!(conservative.monthly_rate, usd(350));
        assert_eq!(conservative.final_value, usd(14_200));
        assert_eq!(optimistic.final_value, usd(17_800));
        assert_eq!(realistic.total_growth, usd(6_000));
    }

    #[test]
    fn test_scenario_ordering_follows_rate_sign() {
        let up = run(usd(250), &[5], ProjectionInterval::Yearly);
        let growth_of = |r: &ProjectionResult, s| r.scenario(s).unwrap().total_growth.amount_minor;
        assert!(growth_of(&up, Scenario::Optimistic) > growth_of(&up, Scenario::Realistic));
        assert!(growth_of(&up, Scenario::Realistic) > growth_of(&up, Scenario::Conservative));

        let down = run(usd(-250), &[5], ProjectionInterval::Yearly);
        assert!(growth_of(&down, Scenario::Optimistic) < growth_of(&down, Scenario::Realistic));
        assert!(growth_of(&down, Scenario::Realistic) < growth_of(&down, Scenario::Conservative));
    }

    #[test]
    fn test_sub_cent_scenario_rates_keep_ordering() {
        let one_cent = run(Money::new(1, "USD"), &[20], ProjectionInterval::Yearly);
        let final_of = |r: &ProjectionResult, s| r.scenario(s).unwrap().final_value.amount_minor;
        assert_eq!(final_of(&one_cent, Scenario::Conservative), 1_000_000 + 168);
        assert_eq!(final_of(&one_cent, Scenario::Realistic), 1_000_000 + 240);
        assert_eq!(final_of(&one_cent, Scenario::Optimistic), 1_000_000 + 312);

        let five_cents = run(Money::new(5, "USD"), &[20], ProjectionInterval::Yearly);
        let conservative = five_cents.scenario(Scenario::Conservative).unwrap();
        assert_eq!(conservative.total_growth, Money::new(840, "USD"));
        assert_eq!(conservative.milestones[&20].growth_from_current, Money::new(840, "USD"));
        // the reported rate is rounded for display only
        assert_eq!(conservative.monthly_rate, Money::new(4, "USD"));
        assert_eq!(
            five_cents.scenario(Scenario::Optimistic).unwrap().total_growth,
            Money::new(1_560, "USD")
        );
    }

    #[test]
    fn test_quarterly_series_and_milestones() {
        let result = run(usd(100), &[2, 1], ProjectionInterval::Quarterly);
        assert_eq!(result.timeframes_years, vec![1, 2]);

        let realistic = result.scenario(Scenario::Realistic).unwrap();
        assert_eq!(realistic.series.len(), 9);
        assert_eq!(realistic.series[1].date, date(2024, 4, 30));

        let one_year = &realistic.milestones[&1];
        assert_eq!(one_year.date, date(2025, 1, 31));
        assert_eq!(one_year.value, usd(11_200));
        assert_eq!(one_year.growth_from_current, usd(1_200));
        assert_eq!(realistic.milestones[&2].date, date(2026, 1, 31));
    }

    #[test]
    fn test_timeframe_validation() {
        let allowed = ProjectionSettings::default().allowed_timeframes;
        let err = validate_timeframes(&[1, 100, 7], &allowed).unwrap_err();
        assert!(err.is_invalid_argument());
        let message = err.to_string();
        assert!(message.contains("100") && message.contains('7'));

        assert!(validate_timeframes(&[], &allowed).unwrap_err().is_invalid_argument());
        assert_eq!(validate_timeframes(&[10, 1, 10], &allowed).unwrap(), vec![1, 10]);
    }

    fn services(months_of_data: u32) -> ProjectionService {
        let account = Account::new(Uuid::new_v4(), "Brokerage", "USD");
        let mut store = InMemoryBalanceStore::new();
        store.add_account(account.clone());
        for i in 0..months_of_data {
            let day = add_months_clamped(date(2024, 1, 1), i as i32);
            store.add_point(BalancePoint::new(account.id, day, usd(10_000 + 500 * i as i64)));
        }

        let net_worth = Arc::new(NetWorthService::new(
            Arc::new(store),
            Arc::new(StaticExchangeRates::new()),
            "USD",
        ));
        let growth = Arc::new(GrowthRateService::new(
            Arc::clone(&net_worth),
            GrowthSettings::default(),
        ));
        ProjectionService::new(net_worth, growth, ProjectionSettings::default())
    }

    #[test]
    fn test_generate_from_history() {
        let service = services(6);
        let result = service
            .generate(date(2024, 6, 15), &[1], ProjectionInterval::Yearly)
            .unwrap();
        assert!(result.has_scenarios());
        assert_eq!(result.current_value, usd(12_500));
        assert_eq!(result.growth_rate.monthly_rate, usd(500));
        assert_eq!(
            result.scenario(Scenario::Realistic).unwrap().final_value,
            usd(18_500)
        );
    }

    #[test]
    fn test_generate_without_history_returns_issue() {
        let service = services(3);
        let result = service
            .generate(date(2024, 3, 15), &[5], ProjectionInterval::Monthly)
            .unwrap();
        assert!(!result.has_scenarios());
        let issue: DataIssue = result.growth_rate.issue.unwrap();
        assert_eq!(issue.code, DataIssueCode::InsufficientHistory);
    }

    #[test]
    fn test_generate_rejects_before_reading_history() {
        let service = services(0);
        let err = service
            .generate(date(2024, 3, 31), &[100], ProjectionInterval::Monthly)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_override_rate() {
        let service = services(1);
        let result = service
            .generate_with_rate(date(2024, 1, 15), &[1], ProjectionInterval::Monthly, usd(1_000))
            .unwrap();
        assert_eq!(result.growth_rate.monthly_rate_percent, 10.0);
        assert_eq!(
            result.scenario(Scenario::Realistic).unwrap().final_value,
            usd(22_000)
        );
    }
}
