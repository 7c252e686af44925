//! Horizon Core - forecasting and categorization engines for personal finance
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core value types (Money, Account, BalancePoint, results)
//! - **ports**: Trait definitions for collaborators (BalanceStore, ExchangeRateProvider, PatternStore)
//! - **services**: Calculators (net worth, growth, projection, retirement, categorization)
//! - **adapters**: Concrete implementations (in-memory, CSV, JSON file, demo data)
//!
//! Nothing in the core reads the system clock: every time-dependent
//! operation takes its reference date as an argument.

pub mod adapters;
pub mod calendar;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use adapters::{csv_source, demo, JsonPatternStore};
use config::Config;
use ports::{BalanceStore, ExchangeRateProvider, PatternStore};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{DataIssue, DataIssueCode, Error, OperationResult, Result};
pub use domain::{
    Account, BalancePoint, CategorizationPattern, CategorySuggestion, GrowthMethod,
    GrowthRateResult, Money, ProjectionInterval, ProjectionResult, RetirementInputs,
    RetirementProjectionResult, TimelineInterval,
};

/// Family that owns patterns learned outside demo mode
pub const LOCAL_FAMILY_ID: Uuid = Uuid::nil();

/// Main context for Horizon operations
///
/// Holds the configuration, the data sources and every service wired to
/// them. Build one per command with the date it should treat as "today".
pub struct HorizonContext {
    pub config: Config,
    pub as_of: NaiveDate,
    pub family_id: Uuid,
    pub balances: Arc<dyn BalanceStore>,
    pub rates: Arc<dyn ExchangeRateProvider>,
    pub patterns: Arc<dyn PatternStore>,
    pub net_worth_service: Arc<NetWorthService>,
    pub growth_service: Arc<GrowthRateService>,
    pub projection_service: ProjectionService,
    pub categorization_service: CategorizationService,
    pub retirement_calculator: RetirementCalculator,
}

impl HorizonContext {
    /// Create a context from the horizon directory
    ///
    /// Demo mode serves the generated dataset anchored at `as_of`. Otherwise
    /// balances and rates come from the CSV files in `horizon_dir` and
    /// patterns from `patterns.json` next to them.
    pub fn new(horizon_dir: &Path, as_of: NaiveDate) -> Result<Self> {
        let config = Config::load(horizon_dir)?;

        if config.demo_mode {
            debug!(%as_of, "using demo dataset");
            let balances = Arc::new(demo::demo_balance_store(as_of));
            let rates = Arc::new(demo::demo_exchange_rates(as_of));
            let patterns = Arc::new(demo::demo_pattern_store(start_of_day(as_of)));
            return Ok(Self::with_stores(config, as_of, demo::DEMO_FAMILY_ID, balances, rates, patterns));
        }

        let (balances, rates) = csv_source::load_directory(horizon_dir)?;
        debug!(
            dir = %horizon_dir.display(),
            points = balances.point_count(),
            rates = rates.len(),
            "loaded csv data"
        );
        let patterns = Arc::new(JsonPatternStore::in_dir(horizon_dir));
        Ok(Self::with_stores(
            config,
            as_of,
            LOCAL_FAMILY_ID,
            Arc::new(balances),
            Arc::new(rates),
            patterns,
        ))
    }

    /// Wire services over caller-provided stores
    pub fn with_stores(
        config: Config,
        as_of: NaiveDate,
        family_id: Uuid,
        balances: Arc<dyn BalanceStore>,
        rates: Arc<dyn ExchangeRateProvider>,
        patterns: Arc<dyn PatternStore>,
    ) -> Self {
        let net_worth_service = Arc::new(NetWorthService::new(
            Arc::clone(&balances),
            Arc::clone(&rates),
            &config.reporting_currency,
        ));
        let growth_service = Arc::new(GrowthRateService::new(
            Arc::clone(&net_worth_service),
            config.growth.clone(),
        ));
        let projection_service = ProjectionService::new(
            Arc::clone(&net_worth_service),
            Arc::clone(&growth_service),
            config.projection.clone(),
        );
        let categorization_service =
            CategorizationService::new(Arc::clone(&patterns), config.categorization.clone());
        let retirement_calculator = RetirementCalculator::new(config.retirement.clone());

        Self {
            config,
            as_of,
            family_id,
            balances,
            rates,
            patterns,
            net_worth_service,
            growth_service,
            projection_service,
            categorization_service,
            retirement_calculator,
        }
    }

    /// `as_of` at midnight UTC, the instant used for pattern timestamps
    pub fn now(&self) -> DateTime<Utc> {
        start_of_day(self.as_of)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_demo_context_has_history() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app": {"demoMode": true}}"#,
        )
        .unwrap();

        let ctx = HorizonContext::new(dir.path(), as_of()).unwrap();
        assert_eq!(ctx.family_id, demo::DEMO_FAMILY_ID);
        let growth = ctx.growth_service.calculate(as_of(), GrowthMethod::Mean).unwrap();
        assert!(growth.sufficient_data);
        assert!(!ctx.patterns.patterns_for_family(ctx.family_id).unwrap().is_empty());
    }

    #[test]
    fn test_csv_context_requires_accounts_file() {
        let dir = TempDir::new().unwrap();
        let result = HorizonContext::new(dir.path(), as_of());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
