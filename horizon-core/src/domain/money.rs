//! Money value type
//!
//! Amounts are held as integer minor units (cents for USD). Any ratio,
//! conversion or growth computation goes through `Decimal` and is rounded
//! back to minor units explicitly.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Currencies without a minor unit (ISO 4217 exponent 0)
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "UYI", "VND",
    "VUV", "XAF", "XOF", "XPF",
];

/// Currencies with three minor-unit digits
const THREE_DECIMAL_CURRENCIES: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

/// An amount of money in a single currency
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's minor unit
    pub amount_minor: i64,
    /// ISO 4217 currency code, uppercase
    pub currency: String,
}

impl Money {
    pub fn new(amount_minor: i64, currency: &str) -> Self {
        Self {
            amount_minor,
            currency: normalize_currency(currency),
        }
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(0, currency)
    }

    /// Number of minor-unit digits for a currency code
    pub fn minor_unit_exponent(currency: &str) -> u32 {
        let code = normalize_currency(currency);
        if ZERO_DECIMAL_CURRENCIES.contains(&code.as_str()) {
            0
        } else if THREE_DECIMAL_CURRENCIES.contains(&code.as_str()) {
            3
        } else {
            2
        }
    }

    /// Amount in major units as an exact decimal (e.g. 12.34)
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount_minor, Self::minor_unit_exponent(&self.currency))
    }

    /// Round a major-unit decimal to the currency's minor unit
    pub fn from_decimal(value: Decimal, currency: &str) -> Result<Self> {
        let exponent = Self::minor_unit_exponent(currency);
        let mut rounded =
            value.round_dp_with_strategy(exponent, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(exponent);
        let amount_minor = i64::try_from(rounded.mantissa()).map_err(|_| {
            Error::calculation(format!("{} {} does not fit in minor units", value, currency))
        })?;
        Ok(Self::new(amount_minor, currency))
    }

    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    pub fn abs(&self) -> Self {
        Self {
            amount_minor: self.amount_minor.saturating_abs(),
            currency: self.currency.clone(),
        }
    }

    pub fn negate(&self) -> Self {
        Self {
            amount_minor: self.amount_minor.saturating_neg(),
            currency: self.currency.clone(),
        }
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(Error::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money> {
        self.ensure_same_currency(other)?;
        let amount_minor = self
            .amount_minor
            .checked_add(other.amount_minor)
            .ok_or_else(|| Error::calculation("money addition overflowed"))?;
        Ok(Self::new(amount_minor, &self.currency))
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money> {
        self.ensure_same_currency(other)?;
        let amount_minor = self
            .amount_minor
            .checked_sub(other.amount_minor)
            .ok_or_else(|| Error::calculation("money subtraction overflowed"))?;
        Ok(Self::new(amount_minor, &self.currency))
    }

    /// Multiply by a decimal factor, rounding back to minor units
    pub fn scale(&self, factor: Decimal) -> Result<Money> {
        let scaled = self
            .to_decimal()
            .checked_mul(factor)
            .ok_or_else(|| Error::calculation("money scaling overflowed"))?;
        Self::from_decimal(scaled, &self.currency)
    }

    /// Convert into another currency with a `from -> to` rate
    pub fn convert(&self, to: &str, rate: Decimal) -> Result<Money> {
        let converted = self
            .to_decimal()
            .checked_mul(rate)
            .ok_or_else(|| Error::calculation("currency conversion overflowed"))?;
        Self::from_decimal(converted, to)
    }

    /// `self / |base| * 100`, rounded to two places; zero when `base` is zero
    pub fn ratio_percent(&self, base: &Money) -> Result<f64> {
        self.ensure_same_currency(base)?;
        if base.is_zero() {
            return Ok(0.0);
        }
        let ratio = Decimal::from(self.amount_minor) / Decimal::from(base.amount_minor).abs()
            * Decimal::ONE_HUNDRED;
        Ok(ratio.round_dp(2).to_f64().unwrap_or(0.0))
    }

    /// Human-readable amount, e.g. `$1,234.56` or `-1,000 JPY`
    pub fn format(&self) -> String {
        let exponent = Self::minor_unit_exponent(&self.currency) as usize;
        let magnitude = format!("{:.*}", exponent, self.to_decimal().abs());
        let (whole, fraction) = match magnitude.split_once('.') {
            Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
            None => (magnitude, None),
        };
        let mut amount = group_thousands(&whole);
        if let Some(fraction) = fraction {
            amount.push('.');
            amount.push_str(&fraction);
        }

        let sign = if self.is_negative() { "-" } else { "" };
        match currency_symbol(&self.currency) {
            Some(symbol) => format!("{}{}{}", sign, symbol, amount),
            None => format!("{}{} {}", sign, amount, self.currency),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Normalize currency code to uppercase
pub fn normalize_currency(currency: &str) -> String {
    currency.trim().to_uppercase()
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, character) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(character);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_round_trip_rounds_half_away_from_zero() {
        let money = Money::from_decimal(dec!(10.005), "usd").unwrap();
        assert_eq!(money.amount_minor, 1001);
        assert_eq!(money.currency, "USD");

        let negative = Money::from_decimal(dec!(-10.005), "USD").unwrap();
        assert_eq!(negative.amount_minor, -1001);
    }

    #[test]
    fn test_minor_unit_exponents() {
        assert_eq!(Money::minor_unit_exponent("JPY"), 0);
        assert_eq!(Money::minor_unit_exponent("kwd"), 3);
        assert_eq!(Money::minor_unit_exponent("EUR"), 2);
        assert_eq!(Money::new(1500, "JPY").to_decimal(), dec!(1500));
    }

    #[test]
    fn test_cross_currency_arithmetic_is_rejected() {
        let usd = Money::new(100, "USD");
        let eur = Money::new(100, "EUR");
        assert!(matches!(
            usd.checked_add(&eur),
            Err(Error::CurrencyMismatch { .. })
        ));
        assert_eq!(usd.checked_sub(&usd).unwrap().amount_minor, 0);
    }

    #[test]
    fn test_convert_rounds_to_target_minor_unit() {
        let eur = Money::new(10_000, "EUR"); // 100.00
        let usd = eur.convert("USD", dec!(1.08333)).unwrap();
        assert_eq!(usd.amount_minor, 10_833);

        let jpy = eur.convert("JPY", dec!(161.256)).unwrap();
        assert_eq!(jpy.amount_minor, 16_126);
    }

    #[test]
    fn test_ratio_percent() {
        let change = Money::new(500_00, "USD");
        let base = Money::new(10_000_00, "USD");
        assert_eq!(change.ratio_percent(&base).unwrap(), 5.0);
        assert_eq!(change.ratio_percent(&Money::zero("USD")).unwrap(), 0.0);
        assert_eq!(change.ratio_percent(&base.negate()).unwrap(), 5.0);
    }

    #[test]
    fn test_format() {
        assert_eq!(Money::new(123_456, "USD").format(), "$1,234.56");
        assert_eq!(Money::new(-100_000_000, "EUR").format(), "-€1,000,000.00");
        assert_eq!(Money::new(5, "GBP").format(), "£0.05");
        assert_eq!(Money::new(1000, "JPY").format(), "1,000 JPY");
    }
}
