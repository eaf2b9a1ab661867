//! Route definitions for the REST API.

mod certifications;
mod health;
mod practice;
mod reviews;
mod simulations;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalog
        .route("/certifications", get(certifications::list_certifications))
        // Practice
        .route("/practice/next", post(practice::next_question))
        .route("/practice/answer", post(practice::submit_answer))
        .route("/progress", get(practice::get_progress))
        // Review queue
        .route("/reviews", post(reviews::enqueue_review))
        .route("/reviews/due", get(reviews::due_reviews))
        .route("/reviews/mastery", get(reviews::concept_mastery))
        .route("/reviews/:item_id", delete(reviews::remove_review))
        .route("/reviews/:item_id/result", post(reviews::record_review))
        // Simulations
        .route(
            "/simulations",
            post(simulations::start_simulation).get(simulations::simulation_history),
        )
        .route("/simulations/:id", get(simulations::get_results))
        .route("/simulations/:id/answers", post(simulations::submit_simulation_answer))
        .route("/simulations/:id/complete", post(simulations::complete_simulation))
        // Attach state
        .with_state(state)
}

pub use certifications::*;
pub use health::*;
pub use practice::*;
pub use reviews::*;
pub use simulations::*;
