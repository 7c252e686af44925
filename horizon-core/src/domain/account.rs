//! Account domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::normalize_currency;

/// Which side of the balance sheet an account sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Asset,
    Liability,
}

impl Classification {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
        }
    }
}

/// A financial account owned by the family
///
/// Liability balances are recorded as the amount owed (positive = debt)
/// and are subtracted when computing net worth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub account_type: Option<String>,
    pub classification: Classification,
    /// ISO 4217 currency code, normalized to uppercase
    pub currency: String,
    /// Hidden accounts are excluded from net worth
    pub visible: bool,
}

impl Account {
    /// Create a new visible asset account
    pub fn new(id: Uuid, name: impl Into<String>, currency: &str) -> Self {
        Self {
            id,
            name: name.into(),
            account_type: None,
            classification: Classification::Asset,
            currency: normalize_currency(currency),
            visible: true,
        }
    }

    /// Set the account type and derive the classification from it
    pub fn with_type(mut self, account_type: &str) -> Self {
        self.classification = Self::compute_classification(Some(account_type));
        self.account_type = Some(account_type.to_lowercase());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Compute classification based on account_type
    /// credit cards, loans and mortgages are liabilities, everything else is an asset
    pub fn compute_classification(account_type: Option<&str>) -> Classification {
        match account_type.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("credit" | "credit_card" | "loan" | "mortgage" | "other_liability") => {
                Classification::Liability
            }
            _ => Classification::Asset,
        }
    }

    pub fn is_liability(&self) -> bool {
        self.classification == Classification::Liability
    }

    /// Validate account data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("account name cannot be empty");
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err("currency must be a three-letter ISO code");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_from_type() {
        assert_eq!(
            Account::compute_classification(Some("Credit")),
            Classification::Liability
        );
        assert_eq!(
            Account::compute_classification(Some("mortgage")),
            Classification::Liability
        );
        assert_eq!(
            Account::compute_classification(Some("depository")),
            Classification::Asset
        );
        assert_eq!(Account::compute_classification(None), Classification::Asset);
    }

    #[test]
    fn test_account_validation() {
        let mut account = Account::new(Uuid::new_v4(), "Checking", " usd ");
        assert_eq!(account.currency, "USD");
        assert!(account.validate().is_ok());

        account.name = "".to_string();
        assert!(account.validate().is_err());

        let bad_currency = Account::new(Uuid::new_v4(), "Savings", "dollars");
        assert!(bad_currency.validate().is_err());
    }
}
