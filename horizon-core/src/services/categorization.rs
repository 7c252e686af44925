//! Categorization service - learn and suggest categories from merchant names

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::similarity::StringSimilarity;
use crate::config::CategorizationSettings;
use crate::domain::result::Result;
use crate::domain::{
    CategorizationPattern, CategorizationSource, CategorySuggestion, LearnOutcome, MatchType,
    PatternKey, PruneResult,
};
use crate::ports::PatternStore;

static HASH_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*\d+").expect("hash number pattern is valid"));
static STORE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:store|location|loc|branch|unit)\s*#?\s*\d+\b")
        .expect("store number pattern is valid")
});
static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3,}\b").expect("bare number pattern is valid"));

/// Normalize a raw merchant or transaction name for matching
///
/// Lowercases, turns punctuation into spaces, drops store/location numbers
/// ("store 123", "#456", bare numbers of 3+ digits) and collapses spaces.
/// The result is a fixed point: normalizing it again changes nothing.
pub fn normalize_merchant(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let without_store = STORE_NUMBER.replace_all(&lowered, " ");
    let without_hash = HASH_NUMBER.replace_all(&without_store, " ");
    let alphanumeric: String = without_hash
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut current = collapse_whitespace(&alphanumeric);
    loop {
        let stripped = STORE_NUMBER.replace_all(&current, " ");
        let stripped = BARE_NUMBER.replace_all(&stripped, " ");
        let next = collapse_whitespace(&stripped);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Categorization service for pattern-based category suggestions
pub struct CategorizationService {
    store: Arc<dyn PatternStore>,
    settings: CategorizationSettings,
    similarity: StringSimilarity,
}

impl CategorizationService {
    pub fn new(store: Arc<dyn PatternStore>, settings: CategorizationSettings) -> Self {
        let similarity = StringSimilarity::new(settings.similarity);
        Self {
            store,
            settings,
            similarity,
        }
    }

    /// Candidate categories for a merchant string, best first
    ///
    /// Exact matches on the normalized merchant win outright; fuzzy
    /// matching is only attempted when there is none.
    pub fn suggest(&self, family_id: Uuid, raw_merchant: &str) -> Result<Vec<CategorySuggestion>> {
        let normalized = normalize_merchant(raw_merchant);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let patterns = self.store.patterns_for_family(family_id)?;
        let suggestions = self.rank(&normalized, &patterns);
        debug!(
            %family_id,
            candidates = patterns.len(),
            suggestions = suggestions.len(),
            "ranked category suggestions"
        );
        Ok(suggestions)
    }

    /// The top suggestion, only if it is confident enough to apply unattended
    pub fn best_match(
        &self,
        family_id: Uuid,
        raw_merchant: &str,
    ) -> Result<Option<CategorySuggestion>> {
        let best = self.suggest(family_id, raw_merchant)?.into_iter().next();
        Ok(best.filter(|s| s.is_auto_applicable(self.settings.auto_apply_threshold)))
    }

    pub fn is_auto_applicable(&self, suggestion: &CategorySuggestion) -> bool {
        suggestion.is_auto_applicable(self.settings.auto_apply_threshold)
    }

    /// Record a confirmed categorization
    ///
    /// Only user confirmations and deterministic rules train patterns;
    /// automated classifications are ignored.
    pub fn learn(
        &self,
        family_id: Uuid,
        raw_merchant: &str,
        category_id: Uuid,
        source: CategorizationSource,
        at: DateTime<Utc>,
    ) -> Result<LearnOutcome> {
        if !source.is_trusted() {
            warn!(%family_id, source = source.as_str(), "refusing to learn from untrusted source");
            return Ok(LearnOutcome::Ignored {
                reason: format!("{} categorizations are not used for learning", source.as_str()),
            });
        }

        let merchant_normalized = normalize_merchant(raw_merchant);
        if merchant_normalized.is_empty() {
            return Ok(LearnOutcome::Ignored {
                reason: "merchant name is empty after normalization".to_string(),
            });
        }

        let key = PatternKey {
            family_id,
            merchant_normalized,
            category_id,
        };
        let pattern = self.store.update_pattern(&key, &mut |existing| match existing {
            Some(pattern) => pattern.record_match(at),
            None => CategorizationPattern::first_match(&key, at),
        })?;

        info!(
            %family_id,
            pattern_id = %pattern.id,
            match_count = pattern.match_count,
            confidence = pattern.confidence_score,
            "learned categorization pattern"
        );
        Ok(LearnOutcome::Learned { pattern })
    }

    /// Delete stale low-usage patterns and patterns below the confidence floor
    pub fn prune(&self, family_id: Uuid, now: DateTime<Utc>) -> Result<PruneResult> {
        let patterns = self.store.patterns_for_family(family_id)?;

        let mut result = PruneResult::default();
        let mut doomed = Vec::new();
        for pattern in &patterns {
            if pattern.is_stale(now, self.settings.stale_after_months)
                && pattern.match_count < self.settings.minimum_matches
            {
                result.stale_removed += 1;
                doomed.push(pattern.id);
            } else if pattern.confidence_score < self.settings.minimum_confidence {
                result.low_confidence_removed += 1;
                doomed.push(pattern.id);
            }
        }

        if !doomed.is_empty() {
            self.store.delete_patterns(family_id, &doomed)?;
        }
        info!(
            %family_id,
            stale = result.stale_removed,
            low_confidence = result.low_confidence_removed,
            "pruned categorization patterns"
        );
        Ok(result)
    }

    /// Stored patterns for a family, most confident first
    pub fn patterns(&self, family_id: Uuid) -> Result<Vec<CategorizationPattern>> {
        let mut patterns = self.store.patterns_for_family(family_id)?;
        patterns.sort_by(|a, b| {
            b.confidence_score
                .total_cmp(&a.confidence_score)
                .then_with(|| a.merchant_normalized.cmp(&b.merchant_normalized))
        });
        Ok(patterns)
    }

    fn rank(&self, normalized: &str, patterns: &[CategorizationPattern]) -> Vec<CategorySuggestion> {
        let exact: Vec<CategorySuggestion> = patterns
            .iter()
            .filter(|p| p.merchant_normalized == normalized)
            .map(|p| suggestion(p, 1.0, MatchType::Exact))
            .collect();

        let candidates = if exact.is_empty() {
            patterns
                .iter()
                .filter(|p| !p.merchant_normalized.is_empty())
                .filter_map(|p| {
                    let similarity = self.similarity.similarity(normalized, &p.merchant_normalized);
                    if similarity < self.settings.fuzzy_threshold {
                        return None;
                    }
                    let match_type = if p.merchant_normalized.contains(normalized)
                        || normalized.contains(p.merchant_normalized.as_str())
                    {
                        MatchType::Partial
                    } else {
                        MatchType::Fuzzy
                    };
                    Some(suggestion(p, similarity, match_type))
                })
                .collect()
        } else {
            exact
        };

        best_per_category(candidates)
    }
}

fn suggestion(pattern: &CategorizationPattern, similarity: f64, match_type: MatchType) -> CategorySuggestion {
    CategorySuggestion {
        category_id: pattern.category_id,
        confidence: (pattern.confidence_score * similarity).min(1.0),
        similarity,
        pattern_id: pattern.id,
        matched_pattern: pattern.merchant_normalized.clone(),
        match_type,
    }
}

fn compare_suggestions(a: &CategorySuggestion, b: &CategorySuggestion) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.similarity.total_cmp(&a.similarity))
        .then_with(|| a.category_id.cmp(&b.category_id))
}

/// Keep the strongest suggestion per category, sorted best first
fn best_per_category(candidates: Vec<CategorySuggestion>) -> Vec<CategorySuggestion> {
    let mut best: HashMap<Uuid, CategorySuggestion> = HashMap::new();
    for candidate in candidates {
        match best.get(&candidate.category_id) {
            Some(existing) if compare_suggestions(existing, &candidate) != Ordering::Greater => {}
            _ => {
                best.insert(candidate.category_id, candidate);
            }
        }
    }
    let mut ranked: Vec<CategorySuggestion> = best.into_values().collect();
    ranked.sort_by(compare_suggestions);
    ranked
}
