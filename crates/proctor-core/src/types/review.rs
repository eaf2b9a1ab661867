//! Spaced-repetition review queue types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How an entry entered the review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReviewSource {
    /// Added by the learner.
    Manual,
    /// Queued after an incorrect answer.
    Auto,
}

/// Scheduling state for one (learner, item) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub learner_id: String,
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_tag: Option<String>,
    /// Interval multiplier, always within [1.3, 2.5].
    pub ease_factor: f64,
    /// Hours until the next review; never below 24.
    pub interval_hours: u32,
    pub repetitions: u32,
    /// Exponentially-weighted recall estimate in [0, 1].
    pub mastery_score: f64,
    pub next_review_at: DateTime<Utc>,
    pub source: ReviewSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewEntry {
    /// Whether the entry is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}

/// A due review joined with its item for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueReview {
    pub item_id: String,
    pub concept_tag: String,
    pub question: String,
    pub domain: String,
    pub next_review_at: DateTime<Utc>,
    pub mastery_score: f64,
    pub repetitions: u32,
}

/// Mastery aggregated over review entries sharing a concept tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMastery {
    pub concept_tag: String,
    /// Arithmetic mean of member mastery scores, three decimals.
    pub mastery_score: f64,
    pub item_count: u32,
    pub last_reviewed: Option<DateTime<Utc>>,
}
