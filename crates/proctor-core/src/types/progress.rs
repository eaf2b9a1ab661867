//! Practice answers, progress reporting, and pass-probability output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

use crate::outcome::AdvisoryRecord;

/// How much the pass estimate can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Estimated chance of passing the real exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassProbability {
    /// Percent in [0, 99], one decimal.
    pub estimate: f64,
    pub confidence: Confidence,
    /// False until enough questions have been answered.
    pub is_active: bool,
    pub questions_remaining: u32,
    /// Domain name -> rounded skill rating.
    #[serde(default)]
    pub domain_contributions: BTreeMap<String, i64>,
}

/// A learner's answer to a practice item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub item_id: String,
    pub selected_index: i32,
    #[serde(default)]
    pub time_spent_seconds: Option<u32>,
}

/// Immediate feedback for a practice answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_index: usize,
    pub explanation: String,
    pub skill_before: f64,
    pub skill_after: f64,
    pub domain: String,
    pub domain_skill_after: f64,
    pub difficulty_after: f64,
    /// Outcome of each non-critical side effect.
    pub advisories: Vec<AdvisoryRecord>,
}

/// Per-domain row of a progress report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainProgress {
    pub domain_id: String,
    pub domain_name: String,
    pub skill_rating: f64,
    pub questions_answered: u32,
    pub questions_correct: u32,
    pub accuracy: f64,
}

/// Learner progress for one certification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub learner_id: String,
    pub global_skill: f64,
    pub total_questions: u32,
    pub total_correct: u32,
    pub accuracy: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub pass_probability: PassProbability,
    pub domains: Vec<DomainProgress>,
}
