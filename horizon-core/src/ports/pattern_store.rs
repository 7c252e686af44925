//! Pattern store port - persistence for categorization patterns

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{CategorizationPattern, PatternKey};

/// Read-modify-write step applied to one pattern row
///
/// Receives the current row (or `None` if absent) and returns the row to store.
pub type PatternUpdate<'a> =
    &'a mut dyn FnMut(Option<&CategorizationPattern>) -> CategorizationPattern;

/// Tenant-scoped storage of categorization patterns
///
/// `update_pattern` must be atomic per key: concurrent updates to the same
/// pattern are serialized so no match is lost.
pub trait PatternStore: Send + Sync {
    /// Every pattern belonging to a family
    fn patterns_for_family(&self, family_id: Uuid) -> Result<Vec<CategorizationPattern>>;

    /// Apply `update` to the row at `key` and persist the result
    fn update_pattern(
        &self,
        key: &PatternKey,
        update: PatternUpdate<'_>,
    ) -> Result<CategorizationPattern>;

    /// Delete patterns by id, returning how many were removed
    fn delete_patterns(&self, family_id: Uuid, ids: &[Uuid]) -> Result<usize>;
}
