//! Balance store port - read-only access to accounts and balance history

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{Account, BalancePoint};

/// Source of accounts and their recorded balances for one family
///
/// Implementations are scoped to a single family; the calculators never
/// see another tenant's data.
pub trait BalanceStore: Send + Sync {
    /// All accounts, visible or not
    fn accounts(&self) -> Result<Vec<Account>>;

    /// Balance points for an account dated on or before `up_to`, any order
    fn balance_points(&self, account_id: Uuid, up_to: NaiveDate) -> Result<Vec<BalancePoint>>;
}
