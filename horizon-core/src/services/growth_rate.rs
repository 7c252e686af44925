//! Growth rate service - historical monthly net worth growth

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::net_worth::NetWorthService;
use crate::calendar::add_months_clamped;
use crate::config::GrowthSettings;
use crate::domain::result::{DataIssue, Result};
use crate::domain::{GrowthMethod, GrowthRateResult, Money, NetWorthSample, Volatility};

/// Estimates monthly growth from a net worth history
pub struct GrowthRateService {
    net_worth: Arc<NetWorthService>,
    settings: GrowthSettings,
}

impl GrowthRateService {
    pub fn new(net_worth: Arc<NetWorthService>, settings: GrowthSettings) -> Self {
        Self {
            net_worth,
            settings,
        }
    }

    /// Monthly growth as of `as_of`
    ///
    /// Insufficient or poor-quality history is reported in the result,
    /// never as an error.
    pub fn calculate(&self, as_of: NaiveDate, method: GrowthMethod) -> Result<GrowthRateResult> {
        let samples = self.monthly_samples(as_of)?;
        let result = estimate_growth(
            &samples,
            method,
            &self.settings,
            self.net_worth.reporting_currency(),
        )?;

        info!(
            %as_of,
            method = method.as_str(),
            sufficient = result.sufficient_data,
            points = result.data_points_used,
            rate = %result.monthly_rate,
            "estimated growth rate"
        );
        Ok(result)
    }

    /// Month-spaced net worth samples ending at `as_of`, oldest first
    pub fn monthly_samples(&self, as_of: NaiveDate) -> Result<Vec<NetWorthSample>> {
        let window = self.settings.minimum_months + self.settings.lookback_padding_months;
        let months_back = i32::try_from(window).unwrap_or(i32::MAX);
        let dates: Vec<NaiveDate> = (0..=months_back)
            .rev()
            .map(|k| add_months_clamped(as_of, -k))
            .collect();
        self.net_worth.samples(&dates)
    }
}

/// Estimate monthly growth from month-spaced samples, oldest first
///
/// Samples taken before any account had data are skipped. The remaining
/// run must hold at least `minimum_months` samples, and no more than
/// `max_missing_ratio` of them may be zero.
pub fn estimate_growth(
    samples: &[NetWorthSample],
    method: GrowthMethod,
    settings: &GrowthSettings,
    currency: &str,
) -> Result<GrowthRateResult> {
    let first_with_data = samples
        .iter()
        .position(NetWorthSample::has_data)
        .unwrap_or(samples.len());
    let history = &samples[first_with_data..];
    let currency = history.first().map_or(currency, |s| s.value.currency.as_str());

    let required = settings.minimum_months.max(2);
    if history.len() < required {
        debug!(found = history.len(), required, "not enough history for growth estimate");
        return Ok(GrowthRateResult::unavailable(
            DataIssue::insufficient_history(required, history.len()),
            method,
            history.len(),
            currency,
        ));
    }

    let missing = history.iter().filter(|s| s.value.is_zero()).count();
    if missing as f64 / history.len() as f64 > settings.max_missing_ratio {
        warn!(missing, total = history.len(), "too many empty months for growth estimate");
        return Ok(GrowthRateResult::unavailable(
            DataIssue::poor_data_quality(missing, history.len()),
            method,
            history.len(),
            currency,
        ));
    }

    let deltas = history
        .windows(2)
        .map(|pair| pair[1].value.checked_sub(&pair[0].value))
        .collect::<Result<Vec<Money>>>()?;
    let values: Vec<Decimal> = deltas.iter().map(Money::to_decimal).collect();

    let rate = match method {
        GrowthMethod::Mean => mean(&values),
        GrowthMethod::Median => median(&values),
        GrowthMethod::Weighted => weighted_mean(&values),
    };
    let monthly_rate = Money::from_decimal(rate, currency)?;

    let latest = &history[history.len() - 1].value;
    let monthly_rate_percent = if latest.is_zero() {
        0.0
    } else {
        (rate / latest.to_decimal().abs() * Decimal::ONE_HUNDRED)
            .round_dp(2)
            .to_f64()
            .unwrap_or(0.0)
    };

    let volatility = classify_volatility(&values, settings);
    let warnings = growth_warnings(&deltas, volatility, settings);

    Ok(GrowthRateResult {
        sufficient_data: true,
        monthly_rate,
        monthly_rate_percent,
        data_points_used: history.len(),
        method,
        volatility,
        warnings,
        issue: None,
    })
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

fn median(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / Decimal::TWO
    } else {
        sorted[mid]
    }
}

/// Linear weights 1..=n, most recent delta heaviest
fn weighted_mean(values: &[Decimal]) -> Decimal {
    let (weighted, total_weight) = values.iter().enumerate().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(sum, weights), (index, value)| {
            let weight = Decimal::from(index + 1);
            (sum + *value * weight, weights + weight)
        },
    );
    if total_weight.is_zero() {
        Decimal::ZERO
    } else {
        weighted / total_weight
    }
}

/// Bucket the coefficient of variation (std dev / |mean|) of the deltas
fn classify_volatility(values: &[Decimal], settings: &GrowthSettings) -> Volatility {
    let floats: Vec<f64> = values.iter().filter_map(|v| v.to_f64()).collect();
    if floats.is_empty() {
        return Volatility::Low;
    }
    let n = floats.len() as f64;
    let mean = floats.iter().sum::<f64>() / n;
    let variance = floats.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    // no meaningful ratio around a zero mean
    if mean == 0.0 {
        return Volatility::Low;
    }

    let cv = std_dev / mean.abs();
    if cv < settings.low_volatility_below {
        Volatility::Low
    } else if cv < settings.medium_volatility_below {
        Volatility::Medium
    } else {
        Volatility::High
    }
}

fn growth_warnings(deltas: &[Money], volatility: Volatility, settings: &GrowthSettings) -> Vec<String> {
    let mut warnings = Vec::new();

    let streak = settings.declining_streak;
    if streak > 0
        && deltas.len() >= streak
        && deltas[deltas.len() - streak..].iter().all(Money::is_negative)
    {
        warnings.push(format!(
            "Net worth fell in each of the last {} months; possible declining trend",
            streak
        ));
    }

    if volatility == Volatility::High {
        warnings.push("Monthly changes are highly volatile; projections are less reliable".to_string());
    }

    if !deltas.is_empty()
        && deltas
            .iter()
            .all(|d| d.amount_minor.saturating_abs() < settings.stagnation_threshold_minor)
    {
        warnings.push("Monthly changes are minimal; growth appears stagnant".to_string());
    }

    warnings
}
