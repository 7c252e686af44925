//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - In-memory stores for balances, rates and patterns
//! - CSV files for account and balance history
//! - A JSON file for learned categorization patterns
//! - The demo dataset

pub mod csv_source;
pub mod demo;
pub mod json_store;
pub mod memory;

pub use json_store::JsonPatternStore;
pub use memory::{InMemoryBalanceStore, InMemoryPatternStore, StaticExchangeRates};
