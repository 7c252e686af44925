//! CLI command implementations

pub mod categorize;
pub mod config;
pub mod demo;
pub mod growth;
pub mod networth;
pub mod project;
pub mod retire;
pub mod similarity;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use horizon_core::adapters::csv_source;
use horizon_core::HorizonContext;

/// Get the horizon directory from environment or default
pub fn get_horizon_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("HORIZON_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".horizon"))
        .ok_or_else(|| anyhow!("Could not find home directory, set HORIZON_DIR"))
}

/// Parse a `--date` argument, defaulting to today
pub fn resolve_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(raw) => csv_source::parse_date(raw)
            .ok_or_else(|| anyhow!("Invalid date '{}', expected YYYY-MM-DD", raw)),
        None => Ok(Local::now().date_naive()),
    }
}

/// Get or create horizon context for the given reference date
pub fn get_context(as_of: NaiveDate) -> Result<HorizonContext> {
    let horizon_dir = get_horizon_dir()?;

    std::fs::create_dir_all(&horizon_dir)
        .with_context(|| format!("Failed to create horizon directory: {:?}", horizon_dir))?;

    tracing::debug!(dir = %horizon_dir.display(), %as_of, "opening horizon context");
    HorizonContext::new(&horizon_dir, as_of).with_context(|| {
        format!(
            "Failed to load data from {:?} (add accounts.csv or run 'hz demo on')",
            horizon_dir
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_date() {
        assert_eq!(
            resolve_date(Some("2024-06-30")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
        );
        assert!(resolve_date(Some("next tuesday")).is_err());
        assert_eq!(resolve_date(None).unwrap(), Local::now().date_naive());
    }
}
