//! In-memory implementations of the ports
//!
//! Used by demo mode, the CSV loader and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::money::normalize_currency;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, BalancePoint, CategorizationPattern, PatternKey};
use crate::ports::{BalanceStore, ExchangeRateProvider, PatternStore, PatternUpdate};

/// Accounts and balance points held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryBalanceStore {
    accounts: Vec<Account>,
    points: HashMap<Uuid, Vec<BalancePoint>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(accounts: Vec<Account>, points: Vec<BalancePoint>) -> Self {
        let mut store = Self {
            accounts,
            points: HashMap::new(),
        };
        for point in points {
            store.add_point(point);
        }
        store
    }

    /// Add an account, replacing any account with the same id
    pub fn add_account(&mut self, account: Account) {
        self.accounts.retain(|a| a.id != account.id);
        self.accounts.push(account);
    }

    pub fn add_point(&mut self, point: BalancePoint) {
        self.points.entry(point.account_id).or_default().push(point);
    }

    pub fn point_count(&self) -> usize {
        self.points.values().map(Vec::len).sum()
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.clone())
    }

    fn balance_points(&self, account_id: Uuid, up_to: NaiveDate) -> Result<Vec<BalancePoint>> {
        Ok(self
            .points
            .get(&account_id)
            .map(|points| points.iter().filter(|p| p.date <= up_to).cloned().collect())
            .unwrap_or_default())
    }
}

/// Exchange rates keyed by currency pair and date
#[derive(Debug, Clone, Default)]
pub struct StaticExchangeRates {
    rates: HashMap<(String, String), BTreeMap<NaiveDate, Decimal>>,
}

impl StaticExchangeRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the `from -> to` rate effective on `date`
    pub fn add_rate(&mut self, from: &str, to: &str, date: NaiveDate, rate: Decimal) {
        self.rates
            .entry((normalize_currency(from), normalize_currency(to)))
            .or_default()
            .insert(date, rate);
    }

    pub fn len(&self) -> usize {
        self.rates.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a direct rate, or invert the reverse pair
    fn lookup(
        &self,
        from: &str,
        to: &str,
        pick: impl Fn(&BTreeMap<NaiveDate, Decimal>) -> Option<Decimal>,
    ) -> Option<Decimal> {
        let from = normalize_currency(from);
        let to = normalize_currency(to);
        if from == to {
            return Some(Decimal::ONE);
        }
        if let Some(rate) = self.rates.get(&(from.clone(), to.clone())).and_then(&pick) {
            return Some(rate);
        }
        self.rates
            .get(&(to, from))
            .and_then(&pick)
            .filter(|rate| !rate.is_zero())
            .map(|rate| Decimal::ONE / rate)
    }
}

impl ExchangeRateProvider for StaticExchangeRates {
    fn rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<Option<Decimal>> {
        Ok(self.lookup(from, to, |series| series.get(&date).copied()))
    }

    fn latest_rate(&self, from: &str, to: &str) -> Result<Option<Decimal>> {
        Ok(self.lookup(from, to, |series| series.values().next_back().copied()))
    }
}

/// Categorization patterns behind a mutex
///
/// The lock is held across the whole read-modify-write in `update_pattern`,
/// which serializes concurrent matches on the same key.
#[derive(Debug, Default)]
pub struct InMemoryPatternStore {
    patterns: Mutex<HashMap<PatternKey, CategorizationPattern>>,
}

impl InMemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patterns(patterns: Vec<CategorizationPattern>) -> Self {
        let map = patterns.into_iter().map(|p| (p.key(), p)).collect();
        Self {
            patterns: Mutex::new(map),
        }
    }

    /// Every stored pattern, across families
    pub fn snapshot(&self) -> Result<Vec<CategorizationPattern>> {
        let patterns = self.lock()?;
        Ok(patterns.values().cloned().collect())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<PatternKey, CategorizationPattern>>> {
        self.patterns
            .lock()
            .map_err(|_| Error::store("pattern store lock poisoned"))
    }
}

impl PatternStore for InMemoryPatternStore {
    fn patterns_for_family(&self, family_id: Uuid) -> Result<Vec<CategorizationPattern>> {
        let patterns = self.lock()?;
        let mut found: Vec<CategorizationPattern> = patterns
            .values()
            .filter(|p| p.family_id == family_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.merchant_normalized.cmp(&b.merchant_normalized));
        Ok(found)
    }

    fn update_pattern(
        &self,
        key: &PatternKey,
        update: PatternUpdate<'_>,
    ) -> Result<CategorizationPattern> {
        let mut patterns = self.lock()?;
        apply_update(&mut patterns, key, update)
    }

    fn delete_patterns(&self, family_id: Uuid, ids: &[Uuid]) -> Result<usize> {
        let mut patterns = self.lock()?;
        Ok(remove_patterns(&mut patterns, family_id, ids))
    }
}

/// Run one read-modify-write against a locked pattern map
pub(crate) fn apply_update(
    patterns: &mut HashMap<PatternKey, CategorizationPattern>,
    key: &PatternKey,
    update: PatternUpdate<'_>,
) -> Result<CategorizationPattern> {
    let updated = update(patterns.get(key));
    if updated.key() != *key {
        return Err(Error::store(format!(
            "pattern update changed its key for merchant '{}'",
            key.merchant_normalized
        )));
    }
    patterns.insert(key.clone(), updated.clone());
    Ok(updated)
}

pub(crate) fn remove_patterns(
    patterns: &mut HashMap<PatternKey, CategorizationPattern>,
    family_id: Uuid,
    ids: &[Uuid],
) -> usize {
    let before = patterns.len();
    patterns.retain(|_, p| p.family_id != family_id || !ids.contains(&p.id));
    before - patterns.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_balance_points_are_bounded_by_date() {
        let account = Account::new(Uuid::new_v4(), "Checking", "USD");
        let store = InMemoryBalanceStore::with_data(
            vec![account.clone()],
            vec![
                BalancePoint::new(account.id, date(2024, 1, 1), crate::domain::Money::new(1, "USD")),
                BalancePoint::new(account.id, date(2024, 2, 1), crate::domain::Money::new(2, "USD")),
            ],
        );
        assert_eq!(store.balance_points(account.id, date(2024, 1, 15)).unwrap().len(), 1);
        assert_eq!(store.balance_points(Uuid::new_v4(), date(2024, 1, 15)).unwrap().len(), 0);
        assert_eq!(store.point_count(), 2);
    }

    #[test]
    fn test_rates_fall_back_to_inverse_pair() {
        let mut rates = StaticExchangeRates::new();
        rates.add_rate("usd", "eur", date(2024, 1, 1), dec!(0.8));
        assert_eq!(rates.rate("USD", "EUR", date(2024, 1, 1)).unwrap(), Some(dec!(0.8)));
        assert_eq!(rates.rate("EUR", "USD", date(2024, 1, 1)).unwrap(), Some(dec!(1.25)));
        assert_eq!(rates.rate("EUR", "USD", date(2024, 1, 2)).unwrap(), None);
        assert_eq!(rates.latest_rate("EUR", "USD").unwrap(), Some(dec!(1.25)));
        assert_eq!(rates.rate("GBP", "GBP", date(2024, 1, 2)).unwrap(), Some(Decimal::ONE));
    }

    #[test]
    fn test_update_pattern_rejects_key_change() {
        let store = InMemoryPatternStore::new();
        let key = PatternKey {
            family_id: Uuid::new_v4(),
            merchant_normalized: "netflix".to_string(),
            category_id: Uuid::new_v4(),
        };
        let other = PatternKey {
            merchant_normalized: "hulu".to_string(),
            ..key.clone()
        };
        let result = store.update_pattern(&key, &mut |_| CategorizationPattern::first_match(&other, Utc::now()));
        assert!(matches!(result, Err(Error::Store(_))));
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_delete_is_scoped_to_family() {
        let now = Utc::now();
        let key = PatternKey {
            family_id: Uuid::new_v4(),
            merchant_normalized: "netflix".to_string(),
            category_id: Uuid::new_v4(),
        };
        let pattern = CategorizationPattern::first_match(&key, now);
        let store = InMemoryPatternStore::with_patterns(vec![pattern.clone()]);

        assert_eq!(store.delete_patterns(Uuid::new_v4(), &[pattern.id]).unwrap(), 0);
        assert_eq!(store.delete_patterns(key.family_id, &[pattern.id]).unwrap(), 1);
    }
}
