//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific calculation. None of them hold mutable state, so
//! a single instance can be shared across threads.

pub mod categorization;
pub mod growth_rate;
pub mod net_worth;
pub mod projection;
pub mod retirement;
pub mod similarity;

pub use categorization::{normalize_merchant, CategorizationService};
pub use growth_rate::{estimate_growth, GrowthRateService};
pub use net_worth::NetWorthService;
pub use projection::ProjectionService;
pub use retirement::RetirementCalculator;
pub use similarity::{jaro, jaro_winkler, StringSimilarity};
