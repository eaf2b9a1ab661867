//! Timed full-length practice exams.

mod manager;
mod quota;
mod scoring;

pub use manager::SimulationManager;
pub use quota::allocate_quotas;
pub use scoring::{score_positions, weighted_score, AnsweredPosition, ScoreCard};
