//! Demo dataset
//!
//! Deterministic data for trying the calculators without real accounts:
//! - 6 accounts (checking, savings, credit card, brokerage, 401(k), a EUR account)
//! - 24 monthly balances on the anchor date's day of month, ending at the anchor
//! - daily EUR/USD rates
//! - a handful of learned categorization patterns
//!
//! History is generated backward from fixed current balances with a seeded
//! generator, so the same anchor date always yields the same data.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::memory::{InMemoryBalanceStore, InMemoryPatternStore, StaticExchangeRates};
use crate::calendar::add_months_clamped;
use crate::domain::{Account, BalancePoint, BalanceSource, CategorizationPattern, Money, PatternKey};

pub const DEMO_FAMILY_ID: Uuid = Uuid::from_u128(0x0d3e_0000_0000_4000_8000_0000_0000_0001);

pub const CHECKING_ID: Uuid = Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);
pub const SAVINGS_ID: Uuid = Uuid::from_u128(0x2222_2222_2222_2222_2222_2222_2222_2222);
pub const CREDIT_CARD_ID: Uuid = Uuid::from_u128(0x3333_3333_3333_3333_3333_3333_3333_3333);
pub const BROKERAGE_ID: Uuid = Uuid::from_u128(0x5555_5555_5555_5555_5555_5555_5555_5555);
pub const RETIREMENT_ID: Uuid = Uuid::from_u128(0x6666_6666_6666_6666_6666_6666_6666_6666);
pub const EURO_SAVINGS_ID: Uuid = Uuid::from_u128(0x7777_7777_7777_7777_7777_7777_7777_7777);

/// Demo spending categories: `(id, name)`
pub const CATEGORIES: [(Uuid, &str); 6] = [
    (Uuid::from_u128(0xca7e_0000_0000_4000_8000_0000_0000_0001), "Groceries"),
    (Uuid::from_u128(0xca7e_0000_0000_4000_8000_0000_0000_0002), "Coffee Shops"),
    (Uuid::from_u128(0xca7e_0000_0000_4000_8000_0000_0000_0003), "Gas & Fuel"),
    (Uuid::from_u128(0xca7e_0000_0000_4000_8000_0000_0000_0004), "Subscriptions"),
    (Uuid::from_u128(0xca7e_0000_0000_4000_8000_0000_0000_0005), "Restaurants"),
    (Uuid::from_u128(0xca7e_0000_0000_4000_8000_0000_0000_0006), "Shopping"),
];

const HISTORY_MONTHS: i32 = 24;

/// Name of a demo category
pub fn category_name(id: Uuid) -> Option<&'static str> {
    CATEGORIES.iter().find(|(c, _)| *c == id).map(|(_, name)| *name)
}

/// Id of a demo category by case-insensitive name
pub fn category_id(name: &str) -> Option<Uuid> {
    let wanted = name.trim().to_lowercase();
    CATEGORIES
        .iter()
        .find(|(_, n)| n.to_lowercase() == wanted)
        .map(|(id, _)| *id)
}

pub fn demo_accounts() -> Vec<Account> {
    vec![
        Account::new(CHECKING_ID, "Primary Checking", "USD").with_type("depository"),
        Account::new(SAVINGS_ID, "High-Yield Savings", "USD").with_type("depository"),
        Account::new(CREDIT_CARD_ID, "Sapphire Reserve", "USD").with_type("credit"),
        Account::new(BROKERAGE_ID, "Individual Brokerage", "USD").with_type("investment"),
        Account::new(RETIREMENT_ID, "401(k)", "USD").with_type("investment"),
        Account::new(EURO_SAVINGS_ID, "Tagesgeld", "EUR").with_type("depository"),
    ]
}

/// How an account's history is walked backward from its current balance
#[derive(Clone, Copy)]
enum Shape {
    /// Paycheck cycles: each month is a random 80-140% of today
    Checking,
    /// Monthly deposit plus interest
    Savings { deposit_minor: i64 },
    /// Owed amount between 40% and 110% of today
    CreditCard,
    /// ~0.8% monthly growth with noise, in basis points
    Market { noise_bps: i64 },
}

/// Simple deterministic random number generator
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 32) as f64 / u32::MAX as f64
    }

    /// Uniform integer in `[low, high]`
    fn between(&mut self, low: i64, high: i64) -> i64 {
        low + ((high - low + 1) as f64 * self.next()).floor().min((high - low) as f64) as i64
    }
}

/// Monthly balance points for every demo account, stepping back from `as_of`
pub fn demo_balance_points(as_of: NaiveDate) -> Vec<BalancePoint> {
    let configs: [(Uuid, i64, &str, Shape); 6] = [
        (CHECKING_ID, 482_347, "USD", Shape::Checking),
        (SAVINGS_ID, 1_875_000, "USD", Shape::Savings { deposit_minor: 75_000 }),
        (CREDIT_CARD_ID, 284_763, "USD", Shape::CreditCard),
        (BROKERAGE_ID, 4_782_315, "USD", Shape::Market { noise_bps: 250 }),
        (RETIREMENT_ID, 8_943_267, "USD", Shape::Market { noise_bps: 150 }),
        (EURO_SAVINGS_ID, 620_000, "EUR", Shape::Savings { deposit_minor: 15_000 }),
    ];

    let mut rng = SimpleRng::new(42);
    let mut points = Vec::new();

    for (account_id, current_minor, currency, shape) in configs {
        let mut balance = current_minor;
        for months_back in 0..HISTORY_MONTHS {
            let date = add_months_clamped(as_of, -months_back);
            if months_back > 0 {
                balance = match shape {
                    Shape::Checking => current_minor * rng.between(80, 140) / 100,
                    Shape::Savings { deposit_minor } => {
                        // remove this month's interest (~4% APR) and deposit
                        let without_interest = balance * 10_000 / 10_033;
                        (without_interest - deposit_minor).max(0)
                    }
                    Shape::CreditCard => current_minor * rng.between(40, 110) / 100,
                    Shape::Market { noise_bps } => {
                        let factor_bps = 10_080 + rng.between(-noise_bps, noise_bps);
                        balance * 10_000 / factor_bps
                    }
                };
            }
            points.push(BalancePoint {
                date,
                account_id,
                amount: Money::new(balance, currency),
                source: BalanceSource::Demo,
            });
        }
    }
    points
}

/// Daily EUR -> USD rates covering the whole history
pub fn demo_exchange_rates(as_of: NaiveDate) -> StaticExchangeRates {
    let mut rates = StaticExchangeRates::new();
    let mut rng = SimpleRng::new(7);
    for months_back in 0..HISTORY_MONTHS {
        let month_end = add_months_clamped(as_of, -months_back);
        let month_start = add_months_clamped(as_of, -months_back - 1) + Duration::days(1);
        // 1.05 - 1.12, flat within a month
        let rate = Decimal::new(10_500 + rng.between(0, 700), 4);
        let mut date = month_start;
        while date <= month_end {
            rates.add_rate("EUR", "USD", date, rate);
            date += Duration::days(1);
        }
    }
    rates
}

/// Learned patterns as if the demo family had categorized for a while
pub fn demo_patterns(now: DateTime<Utc>) -> Vec<CategorizationPattern> {
    let [groceries, coffee, fuel, subscriptions, restaurants, shopping] = CATEGORIES.map(|(id, _)| id);
    // (merchant, category, matches, days since last match)
    let seeds = [
        ("whole foods market", groceries, 24, 3),
        ("trader joe s", groceries, 15, 9),
        ("starbucks", coffee, 31, 1),
        ("blue bottle coffee", coffee, 4, 40),
        ("shell oil", fuel, 12, 14),
        ("netflix", subscriptions, 18, 12),
        ("spotify", subscriptions, 18, 20),
        ("chipotle", restaurants, 7, 25),
        ("the capital grille", restaurants, 2, 210),
        ("amazon mktp", shopping, 9, 6),
    ];

    seeds
        .into_iter()
        .map(|(merchant, category_id, matches, days_ago)| {
            let key = PatternKey {
                family_id: DEMO_FAMILY_ID,
                merchant_normalized: merchant.to_string(),
                category_id,
            };
            let last = now - Duration::days(days_ago);
            let mut pattern = CategorizationPattern::first_match(&key, last - Duration::days(365));
            pattern.match_count = matches;
            pattern.last_matched_at = last;
            pattern.confidence_score = pattern.confidence_at(last);
            pattern
        })
        .collect()
}

pub fn demo_balance_store(as_of: NaiveDate) -> InMemoryBalanceStore {
    InMemoryBalanceStore::with_data(demo_accounts(), demo_balance_points(as_of))
}

pub fn demo_pattern_store(now: DateTime<Utc>) -> InMemoryPatternStore {
    InMemoryPatternStore::with_patterns(demo_patterns(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::BalanceStore;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_history_is_deterministic() {
        assert_eq!(demo_balance_points(as_of()), demo_balance_points(as_of()));
    }

    #[test]
    fn test_every_account_has_full_history() {
        let store = demo_balance_store(as_of());
        for account in store.accounts().unwrap() {
            let points = store.balance_points(account.id, as_of()).unwrap();
            assert_eq!(points.len(), HISTORY_MONTHS as usize, "{}", account.name);
            assert!(points.iter().all(|p| p.amount.currency == account.currency));
            assert!(points.iter().all(|p| !p.amount.is_negative()));
        }
    }

    #[test]
    fn test_current_balances_anchor_history() {
        let points = demo_balance_points(as_of());
        let brokerage_today = points
            .iter()
            .find(|p| p.account_id == BROKERAGE_ID && p.date == as_of())
            .unwrap();
        assert_eq!(brokerage_today.amount, Money::new(4_782_315, "USD"));
    }

    #[test]
    fn test_points_step_back_from_anchor_day() {
        let anchor = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let mut dates: Vec<NaiveDate> = demo_balance_points(anchor)
            .into_iter()
            .filter(|p| p.account_id == CHECKING_ID)
            .map(|p| p.date)
            .collect();
        dates.sort();
        assert_eq!(dates.last(), Some(&anchor));
        assert!(dates.contains(&NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(dates.contains(&NaiveDate::from_ymd_opt(2023, 4, 30).unwrap()));
        assert_eq!(dates.first(), Some(&NaiveDate::from_ymd_opt(2022, 4, 30).unwrap()));
    }

    #[test]
    fn test_rates_cover_every_day() {
        use crate::ports::ExchangeRateProvider;
        let rates = demo_exchange_rates(as_of());
        let start = add_months_clamped(as_of(), -HISTORY_MONTHS) + Duration::days(1);
        let mut date = start;
        while date <= as_of() {
            assert!(rates.rate("EUR", "USD", date).unwrap().is_some(), "{}", date);
            date += Duration::days(1);
        }
    }

    #[test]
    fn test_category_lookup() {
        let id = category_id("groceries").unwrap();
        assert_eq!(category_name(id), Some("Groceries"));
        assert_eq!(category_id("unknown"), None);
    }

    #[test]
    fn test_patterns_have_valid_confidence() {
        let patterns = demo_patterns(Utc::now());
        assert_eq!(patterns.len(), 10);
        assert!(patterns
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.confidence_score) && p.family_id == DEMO_FAMILY_ID));
    }
}
