//! Paired skill/difficulty ratings and the pass-probability estimate built on them.

mod elo;
mod pass_probability;

pub use elo::{
    expected_score, update_ratings, update_ratings_with_k, RatingUpdate, DEFAULT_RATING, K_FACTOR,
};
pub use pass_probability::{DomainStanding, PassProbabilityEstimator, PassProbabilityInput};
