//! Categorization pattern domain model
//!
//! A pattern remembers that a normalized merchant string was confirmed as a
//! given category. Its statistics change only through [`CategorizationPattern::record_match`],
//! which returns a new value; the pattern store persists it atomically.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::add_months_clamped;
use crate::domain::result::{Error, Result};

const FREQUENCY_WEIGHT: f64 = 0.6;
const RECENCY_WEIGHT: f64 = 0.3;
const SPECIFICITY_WEIGHT: f64 = 0.1;

/// Matches needed for a full frequency score
const FREQUENCY_SATURATION: f64 = 20.0;
/// Normalized merchant length for a full specificity score
const SPECIFICITY_SATURATION: f64 = 20.0;
/// Days after the last match during which recency stays at 1.0
const RECENCY_FULL_DAYS: i64 = 30;
/// Days over which recency then decays linearly to 0.0
const RECENCY_DECAY_DAYS: i64 = 150;

/// Where a categorization decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorizationSource {
    /// A person picked or confirmed the category
    User,
    /// A deterministic automation rule applied it
    Rule,
    /// A probabilistic classifier suggested it
    Automated,
}

impl CategorizationSource {
    /// Only trusted sources may train patterns
    pub const fn is_trusted(self) -> bool {
        matches!(self, Self::User | Self::Rule)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Rule => "rule",
            Self::Automated => "automated",
        }
    }
}

impl FromStr for CategorizationSource {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "rule" => Ok(Self::Rule),
            "automated" | "ai" => Ok(Self::Automated),
            _ => Err(Error::invalid_argument(format!(
                "unknown categorization source '{}', expected user, rule or automated",
                value
            ))),
        }
    }
}

/// Identity of a pattern row: one per (family, merchant, category)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternKey {
    pub family_id: Uuid,
    pub merchant_normalized: String,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizationPattern {
    pub id: Uuid,
    pub family_id: Uuid,
    pub merchant_normalized: String,
    pub category_id: Uuid,
    pub match_count: u32,
    /// In `[0, 1]`
    pub confidence_score: f64,
    pub last_matched_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CategorizationPattern {
    /// A pattern created by its first confirmed match
    pub fn first_match(key: &PatternKey, at: DateTime<Utc>) -> Self {
        let mut pattern = Self {
            id: Uuid::new_v4(),
            family_id: key.family_id,
            merchant_normalized: key.merchant_normalized.clone(),
            category_id: key.category_id,
            match_count: 1,
            confidence_score: 0.0,
            last_matched_at: at,
            created_at: at,
        };
        pattern.confidence_score = pattern.confidence_at(at);
        pattern
    }

    pub fn key(&self) -> PatternKey {
        PatternKey {
            family_id: self.family_id,
            merchant_normalized: self.merchant_normalized.clone(),
            category_id: self.category_id,
        }
    }

    /// The pattern after one more confirmed match at `at`
    pub fn record_match(&self, at: DateTime<Utc>) -> Self {
        let mut updated = self.clone();
        updated.match_count = self.match_count.saturating_add(1);
        updated.last_matched_at = at.max(self.last_matched_at);
        updated.confidence_score = updated.confidence_at(at);
        updated
    }

    /// Confidence as it would be recalculated at `now`
    pub fn confidence_at(&self, now: DateTime<Utc>) -> f64 {
        let confidence = FREQUENCY_WEIGHT * self.frequency_score()
            + RECENCY_WEIGHT * self.recency_score(now)
            + SPECIFICITY_WEIGHT * self.specificity_score();
        confidence.clamp(0.0, 1.0)
    }

    pub fn frequency_score(&self) -> f64 {
        (self.match_count as f64 / FREQUENCY_SATURATION).min(1.0)
    }

    /// 1.0 within 30 days of the last match, then linear decay to 0.0 at 180 days
    pub fn recency_score(&self, now: DateTime<Utc>) -> f64 {
        let days = (now - self.last_matched_at).num_days().max(0);
        if days <= RECENCY_FULL_DAYS {
            return 1.0;
        }
        let decayed = (days - RECENCY_FULL_DAYS) as f64 / RECENCY_DECAY_DAYS as f64;
        (1.0 - decayed).max(0.0)
    }

    pub fn specificity_score(&self) -> f64 {
        (self.merchant_normalized.chars().count() as f64 / SPECIFICITY_SATURATION).min(1.0)
    }

    /// No match within the last `months` calendar months
    pub fn is_stale(&self, now: DateTime<Utc>, months: u32) -> bool {
        let today = now.date_naive();
        let cutoff = add_months_clamped(today, -(months.min(i32::MAX as u32) as i32));
        self.last_matched_at.date_naive() < cutoff
    }

    /// Days since the last match, for display
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_matched_at).max(Duration::zero())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Normalized merchants are identical
    Exact,
    /// Jaro-Winkler similarity above the fuzzy threshold
    Fuzzy,
    /// Fuzzy match where one merchant contains the other
    Partial,
}

impl MatchType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::Partial => "partial",
        }
    }
}

/// A candidate category for a merchant string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category_id: Uuid,
    /// Pattern confidence scaled by similarity, capped at 1.0
    pub confidence: f64,
    pub similarity: f64,
    pub pattern_id: Uuid,
    pub matched_pattern: String,
    pub match_type: MatchType,
}

impl CategorySuggestion {
    /// Whether this suggestion may be applied without review
    pub fn is_auto_applicable(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

/// What the learning step did with a categorization event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum LearnOutcome {
    Learned { pattern: CategorizationPattern },
    Ignored { reason: String },
}

/// Counts from a pruning sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneResult {
    pub stale_removed: usize,
    pub low_confidence_removed: usize,
}

impl PruneResult {
    pub fn total(&self) -> usize {
        self.stale_removed + self.low_confidence_removed
    }
}
