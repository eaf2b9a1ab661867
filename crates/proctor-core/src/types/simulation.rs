//! Timed practice exam sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Lifecycle of a simulation session. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    /// Question order fixed, no answer recorded yet.
    Created,
    /// At least one answer recorded.
    InProgress,
    /// Scored; immutable.
    Completed,
}

/// Answer recorded at one position of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub item_id: String,
    /// Chosen option; -1 marks an unanswered position.
    pub selected_index: i32,
    #[serde(default)]
    pub time_spent_seconds: Option<u32>,
}

/// A full-length practice exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSession {
    pub id: String,
    pub learner_id: String,
    pub certification_id: String,
    /// Fixed item order, immutable once created.
    pub question_order: Vec<String>,
    /// Position -> answer. Sparse.
    #[serde(default)]
    pub answers: BTreeMap<usize, RecordedAnswer>,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result: Option<SimulationResult>,
}

impl SimulationSession {
    /// Whether the session has been scored.
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

/// One question of a freshly started session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationQuestion {
    pub item_id: String,
    pub index: usize,
    pub scenario: String,
    pub question: String,
    pub options: Vec<String>,
    pub domain: String,
}

/// Returned from starting a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStart {
    pub session_id: String,
    pub questions: Vec<SimulationQuestion>,
    pub total_questions: usize,
    pub time_limit_minutes: u32,
    pub time_limit_seconds: u32,
}

/// Per-domain tally of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainResult {
    pub domain_name: String,
    pub weight: f64,
    pub questions_total: u32,
    pub questions_correct: u32,
    /// Percent, one decimal.
    pub accuracy: f64,
}

/// Review row for one position of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub index: usize,
    pub item_id: String,
    pub scenario: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub selected_index: i32,
    pub is_correct: bool,
    pub explanation: String,
    pub domain: String,
    pub concept_tag: String,
}

/// Scored outcome of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub session_id: String,
    /// Weighted score on a 0-1000 scale.
    pub score: u32,
    pub is_passed: bool,
    pub pass_threshold: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    pub time_taken_minutes: f64,
    pub domain_results: Vec<DomainResult>,
    pub question_results: Vec<QuestionResult>,
}

/// Listing entry for a learner's simulation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub session_id: String,
    pub certification_id: String,
    pub score: u32,
    pub is_passed: bool,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub time_taken_minutes: f64,
}
