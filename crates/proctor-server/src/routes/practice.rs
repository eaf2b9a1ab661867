//! Adaptive practice endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::Learner;
use crate::state::AppState;
use proctor_core::types::{AnswerOutcome, AnswerSubmission, ProgressReport};
use proctor_core::NextQuestion;

/// Names the certification a request applies to.
#[derive(Debug, Deserialize)]
pub struct CertificationRequest {
    pub certification_id: String,
}

impl CertificationRequest {
    pub(crate) fn id(&self) -> ApiResult<&str> {
        let id = self.certification_id.trim();
        if id.is_empty() {
            return Err(ApiError::bad_request("certification_id is required"));
        }
        Ok(id)
    }
}

/// Next item in the learner's weakest domain.
/// POST /practice/next
pub async fn next_question(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Json(request): Json<CertificationRequest>,
) -> ApiResult<Json<NextQuestion>> {
    let next = state
        .engine
        .next_question(&learner_id, request.id()?)
        .await?;
    Ok(Json(next))
}

/// Record a practice answer.
/// POST /practice/answer
pub async fn submit_answer(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Json(submission): Json<AnswerSubmission>,
) -> ApiResult<Json<AnswerOutcome>> {
    Ok(Json(
        state.engine.submit_answer(&learner_id, &submission).await?,
    ))
}

/// Progress and pass probability within a certification.
/// GET /progress?certification_id=...
pub async fn get_progress(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Query(query): Query<CertificationRequest>,
) -> ApiResult<Json<ProgressReport>> {
    Ok(Json(
        state.engine.progress(&learner_id, query.id()?).await?,
    ))
}
