//! Configuration management
//!
//! Settings live in `settings.json` inside the horizon directory:
//! ```json
//! {
//!   "app": { "demoMode": false, "reportingCurrency": "USD" },
//!   "growth": { "minimumMonths": 6 },
//!   "projection": { "allowedTimeframes": [1, 2, 3, 5, 10, 20] },
//!   "categorization": { "autoApplyThreshold": 0.75 },
//!   "retirement": { "safeWithdrawalRate": "0.04" }
//! }
//! ```
//! Every key is optional; missing keys fall back to their defaults.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money::normalize_currency;
use crate::domain::result::{Error, Result};

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    growth: GrowthSettings,
    #[serde(default)]
    projection: ProjectionSettings,
    #[serde(default)]
    categorization: CategorizationSettings,
    #[serde(default)]
    retirement: RetirementSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reporting_currency: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Growth rate estimation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthSettings {
    /// Monthly samples required before a rate is estimated
    pub minimum_months: usize,
    /// Extra months of look-back beyond `minimum_months`
    pub lookback_padding_months: usize,
    /// Share of zero samples above which data quality is too poor
    pub max_missing_ratio: f64,
    /// Deltas all below this (minor units) are flagged as stagnant
    pub stagnation_threshold_minor: i64,
    pub low_volatility_below: f64,
    pub medium_volatility_below: f64,
    /// Consecutive negative months that trigger a declining-trend warning
    pub declining_streak: usize,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            minimum_months: 6,
            lookback_padding_months: 3,
            max_missing_ratio: 0.30,
            stagnation_threshold_minor: 1_000,
            low_volatility_below: 0.5,
            medium_volatility_below: 1.5,
            declining_streak: 3,
        }
    }
}

/// Net worth projection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionSettings {
    pub conservative_multiplier: Decimal,
    pub realistic_multiplier: Decimal,
    pub optimistic_multiplier: Decimal,
    /// Horizons (years) a caller may request
    pub allowed_timeframes: Vec<u32>,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            conservative_multiplier: Decimal::new(70, 2),
            realistic_multiplier: Decimal::ONE,
            optimistic_multiplier: Decimal::new(130, 2),
            allowed_timeframes: vec![1, 2, 3, 5, 10, 20],
        }
    }
}

/// Jaro-Winkler tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimilaritySettings {
    /// Winkler prefix scale
    pub scale_factor: f64,
    /// Longest common prefix that earns a bonus
    pub prefix_cap: usize,
}

impl Default for SimilaritySettings {
    fn default() -> Self {
        Self {
            scale_factor: 0.1,
            prefix_cap: 4,
        }
    }
}

/// Merchant categorization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategorizationSettings {
    pub fuzzy_threshold: f64,
    pub auto_apply_threshold: f64,
    /// Patterns below this confidence are pruned
    pub minimum_confidence: f64,
    pub stale_after_months: u32,
    /// Stale patterns with fewer matches than this are pruned
    pub minimum_matches: u32,
    pub similarity: SimilaritySettings,
}

impl Default for CategorizationSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.80,
            auto_apply_threshold: 0.75,
            minimum_confidence: 0.30,
            stale_after_months: 6,
            minimum_matches: 5,
            similarity: SimilaritySettings::default(),
        }
    }
}

/// Retirement heuristics
///
/// The defaults encode the "4% rule". They are planning shortcuts, not a
/// decumulation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetirementSettings {
    pub safe_withdrawal_rate: Decimal,
    /// Savings needed per unit of annual expenses
    pub savings_multiplier: Decimal,
    pub max_extra_working_years: u32,
}

impl Default for RetirementSettings {
    fn default() -> Self {
        Self {
            safe_withdrawal_rate: Decimal::new(4, 2),
            savings_multiplier: Decimal::new(25, 0),
            max_extra_working_years: 10,
        }
    }
}

/// Horizon configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub demo_mode: bool,
    pub reporting_currency: String,
    pub growth: GrowthSettings,
    pub projection: ProjectionSettings,
    pub categorization: CategorizationSettings,
    pub retirement: RetirementSettings,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            reporting_currency: "USD".to_string(),
            growth: GrowthSettings::default(),
            projection: ProjectionSettings::default(),
            categorization: CategorizationSettings::default(),
            retirement: RetirementSettings::default(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the horizon directory
    ///
    /// Environment overrides (for CI/testing):
    /// - `HORIZON_DEMO_MODE`
    /// - `HORIZON_REPORTING_CURRENCY`
    pub fn load(horizon_dir: &Path) -> Result<Self> {
        let settings_path = horizon_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "settings.json is unreadable, using defaults");
                SettingsFile::default()
            })
        } else {
            SettingsFile::default()
        };

        let demo_mode = match std::env::var("HORIZON_DEMO_MODE").ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.app.demo_mode,
        };

        let reporting_currency = std::env::var("HORIZON_REPORTING_CURRENCY")
            .ok()
            .or_else(|| raw.app.reporting_currency.clone())
            .map(|c| normalize_currency(&c))
            .unwrap_or_else(|| "USD".to_string());

        let config = Self {
            demo_mode,
            reporting_currency,
            growth: raw.growth.clone(),
            projection: raw.projection.clone(),
            categorization: raw.categorization.clone(),
            retirement: raw.retirement.clone(),
            _raw_settings: raw,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to the horizon directory
    /// Preserves other settings that horizon doesn't manage
    pub fn save(&self, horizon_dir: &Path) -> Result<()> {
        let settings_path = horizon_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.app.demo_mode = self.demo_mode;
        settings.app.reporting_currency = Some(self.reporting_currency.clone());
        settings.growth = self.growth.clone();
        settings.projection = self.projection.clone();
        settings.categorization = self.categorization.clone();
        settings.retirement = self.retirement.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Reject settings the calculators cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.reporting_currency.len() != 3 {
            return Err(Error::Config(format!(
                "reporting currency '{}' is not an ISO code",
                self.reporting_currency
            )));
        }
        if self.growth.minimum_months < 2 {
            return Err(Error::Config(
                "growth.minimumMonths must be at least 2".to_string(),
            ));
        }
        if self.projection.allowed_timeframes.is_empty() {
            return Err(Error::Config(
                "projection.allowedTimeframes must not be empty".to_string(),
            ));
        }

        let unit_interval = [
            ("growth.maxMissingRatio", self.growth.max_missing_ratio),
            ("categorization.fuzzyThreshold", self.categorization.fuzzy_threshold),
            ("categorization.autoApplyThreshold", self.categorization.auto_apply_threshold),
            ("categorization.minimumConfidence", self.categorization.minimum_confidence),
        ];
        for (name, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }

        let scale = self.categorization.similarity.scale_factor;
        if !(0.0..=0.25).contains(&scale) {
            return Err(Error::Config(format!(
                "categorization.similarity.scaleFactor must be within [0, 0.25], got {}",
                scale
            )));
        }
        Ok(())
    }

    /// Effective settings in the settings.json layout, without unknown keys
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "app": {
                "demoMode": self.demo_mode,
                "reportingCurrency": self.reporting_currency,
            },
            "growth": serde_json::to_value(&self.growth)?,
            "projection": serde_json::to_value(&self.projection)?,
            "categorization": serde_json::to_value(&self.categorization)?,
            "retirement": serde_json::to_value(&self.retirement)?,
        }))
    }

    /// Enable demo mode
    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    /// Disable demo mode
    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.growth.minimum_months, 6);
        assert_eq!(config.projection.allowed_timeframes, vec![1, 2, 3, 5, 10, 20]);
        assert_eq!(config.categorization.auto_apply_threshold, 0.75);
        assert_eq!(config.retirement.savings_multiplier, Decimal::new(25, 0));
    }

    #[test]
    fn test_partial_settings_merge_with_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app": {"reportingCurrency": "eur"}, "growth": {"minimumMonths": 12}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.growth.minimum_months, 12);
        assert_eq!(config.growth.lookback_padding_months, 3);
        assert_eq!(config.categorization.fuzzy_threshold, 0.80);
        // env override may be set by the harness; only check when it isn't
        if std::env::var("HORIZON_REPORTING_CURRENCY").is_err() {
            assert_eq!(config.reporting_currency, "EUR");
        }
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app": {"theme": "dark"}, "plugins": {"x": 1}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.enable_demo_mode();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("settings.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["app"]["theme"], "dark");
        assert_eq!(saved["app"]["demoMode"], true);
        assert_eq!(saved["plugins"]["x"], 1);
    }

    #[test]
    fn test_effective_settings_use_file_layout() {
        let value = Config::default().to_json().unwrap();
        assert_eq!(value["app"]["reportingCurrency"], "USD");
        assert_eq!(value["growth"]["minimumMonths"], 6);
        assert_eq!(value["categorization"]["similarity"]["prefixCap"], 4);
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"categorization": {"autoApplyThreshold": 1.5}}"#,
        )
        .unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));
    }
}
