//! Learner skill profiles and answer history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::rating::DEFAULT_RATING;

/// A learner's rating in one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSkill {
    pub domain_id: String,
    pub skill_rating: f64,
    pub questions_answered: u32,
    pub questions_correct: u32,
}

impl DomainSkill {
    /// Fresh domain entry at the default rating.
    pub fn new(domain_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            skill_rating: DEFAULT_RATING,
            questions_answered: 0,
            questions_correct: 0,
        }
    }
}

/// Per-learner skill state. Created implicitly on the first answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillProfile {
    pub learner_id: String,
    pub global_skill: f64,
    /// Domain id -> skill row.
    #[serde(default)]
    pub domain_skills: HashMap<String, DomainSkill>,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_active_date: Option<NaiveDate>,
}

impl SkillProfile {
    /// New profile at the default global rating.
    pub fn new(learner_id: impl Into<String>) -> Self {
        Self {
            learner_id: learner_id.into(),
            global_skill: DEFAULT_RATING,
            domain_skills: HashMap::new(),
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
        }
    }

    /// Rating in a domain, if the learner has one.
    pub fn domain_rating(&self, domain_id: &str) -> Option<f64> {
        self.domain_skills.get(domain_id).map(|s| s.skill_rating)
    }

    /// Advance the daily streak for activity on `today`.
    ///
    /// Returns true when the streak counters changed.
    pub fn record_activity(&mut self, today: NaiveDate) -> bool {
        let next = match self.last_active_date {
            Some(last) if last == today => return false,
            Some(last) if last.succ_opt() == Some(today) => self.current_streak + 1,
            _ => 1,
        };
        self.current_streak = next;
        self.longest_streak = self.longest_streak.max(next);
        self.last_active_date = Some(today);
        true
    }
}

/// A graded practice answer, ready to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeAnswer {
    pub learner_id: String,
    pub item_id: String,
    pub selected_index: i32,
    pub is_correct: bool,
    #[serde(default)]
    pub time_spent_seconds: Option<u32>,
    pub answered_at: DateTime<Utc>,
}

/// Ratings on both sides of a recorded practice answer.
///
/// Global and domain skill are both updated against `difficulty_before`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PracticeRatings {
    pub skill_before: f64,
    pub skill_after: f64,
    pub domain_skill_after: f64,
    pub difficulty_before: f64,
    pub difficulty_after: f64,
    /// Expected score of the global skill against the item.
    pub expected: f64,
}

pub(crate) fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 1)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_streak_starts_at_one() {
        let mut profile = SkillProfile::new("u1");
        assert!(profile.record_activity(day(1)));
        assert_eq!(profile.current_streak, 1);
        assert_eq!(profile.longest_streak, 1);
    }

    #[test]
    fn test_streak_same_day_is_unchanged() {
        let mut profile = SkillProfile::new("u1");
        profile.record_activity(day(1));
        assert!(!profile.record_activity(day(1)));
        assert_eq!(profile.current_streak, 1);
    }

    #[test]
    fn test_streak_consecutive_days_extend_and_gap_resets() {
        let mut profile = SkillProfile::new("u1");
        profile.record_activity(day(1));
        profile.record_activity(day(2));
        profile.record_activity(day(3));
        assert_eq!(profile.current_streak, 3);

        profile.record_activity(day(7));
        assert_eq!(profile.current_streak, 1);
        assert_eq!(profile.longest_streak, 3);
    }

    #[test]
    fn test_percent_rounds_to_one_decimal() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(0, 0), 0.0);
    }
}
