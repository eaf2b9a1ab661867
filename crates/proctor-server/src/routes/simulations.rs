//! Exam simulation endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extract::Learner;
use crate::routes::practice::CertificationRequest;
use crate::state::AppState;
use proctor_core::types::{SimulationResult, SimulationStart, SimulationSummary};

#[derive(Debug, Deserialize)]
pub struct SimulationAnswerRequest {
    pub index: usize,
    pub item_id: String,
    pub selected_index: i32,
    #[serde(default)]
    pub time_spent_seconds: Option<u32>,
}

/// Assemble and start a full-length simulation.
/// POST /simulations
pub async fn start_simulation(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Json(request): Json<CertificationRequest>,
) -> ApiResult<(StatusCode, Json<SimulationStart>)> {
    let start = state
        .engine
        .simulations()
        .start(&learner_id, request.id()?)
        .await?;
    Ok((StatusCode::CREATED, Json(start)))
}

/// Record an answer. No feedback until completion.
/// POST /simulations/:id/answers
pub async fn submit_simulation_answer(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Path(session_id): Path<String>,
    Json(request): Json<SimulationAnswerRequest>,
) -> ApiResult<StatusCode> {
    state
        .engine
        .simulations()
        .submit_answer(
            &session_id,
            &learner_id,
            request.index,
            &request.item_id,
            request.selected_index,
            request.time_spent_seconds,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Score and close a simulation.
/// POST /simulations/:id/complete
pub async fn complete_simulation(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SimulationResult>> {
    Ok(Json(
        state
            .engine
            .simulations()
            .complete(&session_id, &learner_id)
            .await?,
    ))
}

/// Result of a completed simulation.
/// GET /simulations/:id
pub async fn get_results(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SimulationResult>> {
    Ok(Json(
        state
            .engine
            .simulations()
            .results(&session_id, &learner_id)
            .await?,
    ))
}

/// Completed simulations, newest first.
/// GET /simulations
pub async fn simulation_history(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
) -> ApiResult<Json<Vec<SimulationSummary>>> {
    Ok(Json(state.engine.simulations().history(&learner_id).await?))
}
