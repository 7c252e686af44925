//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. The calculators
//! depend only on these traits, not on concrete implementations. All ports
//! are synchronous; caching, retries and timeouts belong to implementations.

mod balance_store;
mod exchange_rates;
mod pattern_store;

pub use balance_store::BalanceStore;
pub use exchange_rates::ExchangeRateProvider;
pub use pattern_store::{PatternStore, PatternUpdate};
