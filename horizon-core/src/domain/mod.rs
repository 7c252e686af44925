//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
pub mod balance;
pub mod growth;
pub mod money;
pub mod net_worth;
pub mod pattern;
pub mod projection;
pub mod result;
pub mod retirement;

pub use account::{Account, Classification};
pub use balance::{BalancePoint, BalanceSource};
pub use growth::{GrowthMethod, GrowthRateResult, Volatility};
pub use money::Money;
pub use net_worth::{
    AccountContribution, NetWorthBreakdown, NetWorthSample, NetWorthSummary, TimelineInterval,
    TimelinePoint,
};
pub use pattern::{
    CategorizationPattern, CategorizationSource, CategorySuggestion, LearnOutcome, MatchType,
    PatternKey, PruneResult,
};
pub use projection::{
    Milestone, ProjectedPoint, ProjectionInterval, ProjectionResult, Scenario, ScenarioProjection,
};
pub use result::{DataIssue, DataIssueCode, Error, Result};
pub use retirement::{
    Recommendation, RecommendationKind, RetirementInputs, RetirementProjectionResult,
    RetirementScenario, TrajectoryPoint,
};
