//! SM-2 style interval and ease updates.
//!
//! Correct: interval grows by the current ease, ease rises by a bonus.
//! Incorrect: interval resets to the initial value, ease drops by a penalty.
//! Ease is clamped to [min_ease, max_ease] on every update.

use chrono::{DateTime, Duration, Utc};

use crate::config::ReviewConfig;
use crate::types::{round_to, ReviewEntry, ReviewSource};

/// Pure review state transitions.
#[derive(Debug, Clone, Default)]
pub struct ReviewScheduler {
    config: ReviewConfig,
}

impl ReviewScheduler {
    pub fn new(config: ReviewConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// A fresh entry, first due one initial interval from `now`.
    pub fn new_entry(
        &self,
        learner_id: &str,
        item_id: &str,
        concept_tag: Option<String>,
        source: ReviewSource,
        now: DateTime<Utc>,
    ) -> ReviewEntry {
        let interval = self.config.initial_interval_hours;
        ReviewEntry {
            learner_id: learner_id.to_string(),
            item_id: item_id.to_string(),
            concept_tag,
            ease_factor: self.config.initial_ease,
            interval_hours: interval,
            repetitions: 0,
            mastery_score: 0.0,
            next_review_at: due_at(now, interval),
            source,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply one review outcome.
    pub fn review(&self, entry: &ReviewEntry, correct: bool, now: DateTime<Utc>) -> ReviewEntry {
        let cfg = &self.config;
        let retention = cfg.mastery_retention;

        let (interval, ease, repetitions, outcome) = if correct {
            let grown = (f64::from(entry.interval_hours) * entry.ease_factor).floor();
            (
                (grown as u32).max(cfg.initial_interval_hours),
                entry.ease_factor + cfg.ease_bonus,
                entry.repetitions + 1,
                1.0,
            )
        } else {
            (
                cfg.initial_interval_hours,
                entry.ease_factor - cfg.ease_penalty,
                entry.repetitions,
                0.0,
            )
        };

        // Rounding keeps repeated +/- steps from drifting off the clamp bounds.
        let ease = round_to(ease, 2).clamp(cfg.min_ease, cfg.max_ease);
        let mastery = round_to(retention * entry.mastery_score + (1.0 - retention) * outcome, 3);

        ReviewEntry {
            ease_factor: ease,
            interval_hours: interval,
            repetitions,
            mastery_score: mastery,
            next_review_at: due_at(now, interval),
            updated_at: now,
            ..entry.clone()
        }
    }
}

/// 9999-12-31T23:59:59Z, the last instant with a four-digit year.
const LATEST_DUE_SECS: i64 = 253_402_300_799;

/// Due time `interval_hours` after `now`, capped at [`latest_due`].
///
/// The interval itself may keep growing; only the timestamp is bounded.
fn due_at(now: DateTime<Utc>, interval_hours: u32) -> DateTime<Utc> {
    let latest = latest_due();
    now.checked_add_signed(Duration::hours(i64::from(interval_hours)))
        .map_or(latest, |due| due.min(latest))
}

/// Latest due time the scheduler hands out.
pub(crate) fn latest_due() -> DateTime<Utc> {
    DateTime::from_timestamp(LATEST_DUE_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
