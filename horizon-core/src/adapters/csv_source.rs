//! CSV loader for accounts, balance history and exchange rates
//!
//! Expected files in the data directory:
//! - `accounts.csv`: `id,name,type,currency,visible`
//! - `balances.csv`: `account_id,date,amount`
//! - `rates.csv` (optional): `from,to,date,rate`
//!
//! Amounts are in major units (`1234.56`, `$1,234.56` or `(12.00)` for negatives).
//! Liability balances are the amount owed.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::memory::{InMemoryBalanceStore, StaticExchangeRates};
use crate::domain::result::{Error, Result};
use crate::domain::{Account, BalancePoint, Money};

pub const ACCOUNTS_FILE: &str = "accounts.csv";
pub const BALANCES_FILE: &str = "balances.csv";
pub const RATES_FILE: &str = "rates.csv";

#[derive(Debug, Deserialize)]
struct AccountRow {
    id: String,
    name: String,
    #[serde(rename = "type", default)]
    account_type: Option<String>,
    currency: String,
    #[serde(default)]
    visible: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BalanceRow {
    account_id: String,
    date: String,
    amount: String,
}

#[derive(Debug, Deserialize)]
struct RateRow {
    from: String,
    to: String,
    date: String,
    rate: String,
}

/// Load balances and rates from a data directory
pub fn load_directory(dir: &Path) -> Result<(InMemoryBalanceStore, StaticExchangeRates)> {
    let accounts_path = dir.join(ACCOUNTS_FILE);
    if !accounts_path.exists() {
        return Err(Error::not_found(format!(
            "{} not found in {}",
            ACCOUNTS_FILE,
            dir.display()
        )));
    }

    let accounts = read_accounts(&accounts_path)?;
    let balances_path = dir.join(BALANCES_FILE);
    let points = if balances_path.exists() {
        read_balances(&balances_path, &accounts)?
    } else {
        Vec::new()
    };

    let rates_path = dir.join(RATES_FILE);
    let rates = if rates_path.exists() {
        read_rates(&rates_path)?
    } else {
        StaticExchangeRates::new()
    };

    info!(
        accounts = accounts.len(),
        balances = points.len(),
        rates = rates.len(),
        dir = %dir.display(),
        "loaded CSV data"
    );
    Ok((InMemoryBalanceStore::with_data(accounts, points), rates))
}

pub fn read_accounts(path: &Path) -> Result<Vec<Account>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut accounts = Vec::new();

    for (index, row) in reader.deserialize::<AccountRow>().enumerate() {
        let row = row?;
        let line = index + 2;
        let id = parse_uuid(&row.id, line)?;

        let mut account = Account::new(id, row.name.trim(), &row.currency);
        if let Some(account_type) = row.account_type.as_deref().filter(|t| !t.trim().is_empty()) {
            account = account.with_type(account_type.trim());
        }
        if let Some(visible) = row.visible.as_deref() {
            if !parse_bool(visible, line)? {
                account = account.hidden();
            }
        }
        account
            .validate()
            .map_err(|e| Error::invalid_argument(format!("line {}: {}", line, e)))?;
        accounts.push(account);
    }
    Ok(accounts)
}

pub fn read_balances(path: &Path, accounts: &[Account]) -> Result<Vec<BalancePoint>> {
    let currencies: HashMap<Uuid, &str> = accounts
        .iter()
        .map(|a| (a.id, a.currency.as_str()))
        .collect();

    let mut reader = csv::Reader::from_path(path)?;
    let mut points = Vec::new();
    for (index, row) in reader.deserialize::<BalanceRow>().enumerate() {
        let row = row?;
        let line = index + 2;
        let account_id = parse_uuid(&row.account_id, line)?;
        let currency = currencies.get(&account_id).ok_or_else(|| {
            Error::invalid_argument(format!("line {}: unknown account {}", line, account_id))
        })?;
        let date = parse_date(&row.date)
            .ok_or_else(|| Error::invalid_argument(format!("line {}: bad date '{}'", line, row.date)))?;
        let amount = parse_amount(&row.amount).ok_or_else(|| {
            Error::invalid_argument(format!("line {}: bad amount '{}'", line, row.amount))
        })?;

        points.push(BalancePoint::from_import(
            account_id,
            date,
            Money::from_decimal(amount, currency)?,
        ));
    }
    debug!(count = points.len(), "read balance points");
    Ok(points)
}

pub fn read_rates(path: &Path) -> Result<StaticExchangeRates> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rates = StaticExchangeRates::new();
    for (index, row) in reader.deserialize::<RateRow>().enumerate() {
        let row = row?;
        let line = index + 2;
        let date = parse_date(&row.date)
            .ok_or_else(|| Error::invalid_argument(format!("line {}: bad date '{}'", line, row.date)))?;
        let rate: Decimal = row.rate.trim().parse().map_err(|_| {
            Error::invalid_argument(format!("line {}: bad rate '{}'", line, row.rate))
        })?;
        if rate <= Decimal::ZERO {
            return Err(Error::invalid_argument(format!(
                "line {}: rate must be positive, got {}",
                line, rate
            )));
        }
        rates.add_rate(&row.from, &row.to, date, rate);
    }
    Ok(rates)
}

fn parse_uuid(value: &str, line: usize) -> Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| Error::invalid_argument(format!("line {}: bad account id '{}'", line, value)))
}

fn parse_bool(value: &str, line: usize) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "" | "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(Error::invalid_argument(format!(
            "line {}: expected true/false for visible, got '{}'",
            line, other
        ))),
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let formats = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a major-unit amount, accepting symbols, grouping commas and `(x)` negatives
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (is_negative, s) = match s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };

    let mut cleaned = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '0'..='9' | '.' | '-' => cleaned.push(c),
            ',' | '$' | '€' | '£' | '¥' => {}
            c if c.is_whitespace() => {}
            _ => return None,
        }
    }
    let amount: Decimal = cleaned.parse().ok()?;

    if is_negative && amount > Decimal::ZERO {
        Some(-amount)
    } else {
        Some(amount)
    }
}
