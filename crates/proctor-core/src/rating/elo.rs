//! ELO-style rating exchange between a learner and an item.
//!
//! A correct answer moves skill up and difficulty down by the same amount;
//! an incorrect answer does the reverse. Neither rating is bounded.

use serde::{Deserialize, Serialize};

/// Starting rating for learners, domains, and items.
pub const DEFAULT_RATING: f64 = 1000.0;

/// Magnitude of a single rating update.
pub const K_FACTOR: f64 = 32.0;

/// Probability that a player rated `a` beats one rated `b`.
///
/// Returns 0.5 when `a == b` and is strictly within (0, 1).
pub fn expected_score(a: f64, b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((b - a) / 400.0))
}

/// Result of one rating exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub new_skill: f64,
    pub new_difficulty: f64,
    pub expected: f64,
}

impl RatingUpdate {
    /// Change applied to the skill rating.
    pub fn skill_delta(&self, skill: f64) -> f64 {
        self.new_skill - skill
    }
}

/// Update skill and difficulty after an answer, using [`K_FACTOR`].
pub fn update_ratings(skill: f64, difficulty: f64, correct: bool) -> RatingUpdate {
    update_ratings_with_k(skill, difficulty, correct, K_FACTOR)
}

/// Update skill and difficulty with an explicit K-factor.
pub fn update_ratings_with_k(skill: f64, difficulty: f64, correct: bool, k: f64) -> RatingUpdate {
    let expected = expected_score(skill, difficulty);
    let actual = if correct { 1.0 } else { 0.0 };
    let delta = k * (actual - expected);

    RatingUpdate {
        new_skill: skill + delta,
        new_difficulty: difficulty - delta,
        expected,
    }
}
