//! Review queue endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extract::Learner;
use crate::state::AppState;
use proctor_core::types::{ConceptMastery, DueReview, ReviewEntry, ReviewSource};

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub item_id: String,
    #[serde(default)]
    pub concept_tag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    /// False when the item was already queued.
    pub queued: bool,
}

#[derive(Debug, Deserialize)]
pub struct DueQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewResultRequest {
    pub correct: bool,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: bool,
}

/// Bookmark an item for review.
/// POST /reviews
pub async fn enqueue_review(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Json(request): Json<EnqueueRequest>,
) -> ApiResult<Json<EnqueueResponse>> {
    let queued = state
        .engine
        .reviews()
        .enqueue(
            &learner_id,
            &request.item_id,
            request.concept_tag.as_deref(),
            ReviewSource::Manual,
        )
        .await?;
    Ok(Json(EnqueueResponse { queued }))
}

/// Reviews due now.
/// GET /reviews/due?limit=...
pub async fn due_reviews(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Query(query): Query<DueQuery>,
) -> ApiResult<Json<Vec<DueReview>>> {
    let due = state
        .engine
        .reviews()
        .due_reviews(&learner_id, query.limit)
        .await?;
    Ok(Json(due))
}

/// Apply a review outcome.
/// POST /reviews/:item_id/result
pub async fn record_review(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Path(item_id): Path<String>,
    Json(request): Json<ReviewResultRequest>,
) -> ApiResult<Json<ReviewEntry>> {
    let entry = state
        .engine
        .reviews()
        .record_review(&learner_id, &item_id, request.correct)
        .await?;
    Ok(Json(entry))
}

/// Remove an item from the queue.
/// DELETE /reviews/:item_id
pub async fn remove_review(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
    Path(item_id): Path<String>,
) -> ApiResult<Json<RemoveResponse>> {
    let removed = state.engine.reviews().remove(&learner_id, &item_id).await?;
    Ok(Json(RemoveResponse { removed }))
}

/// Mastery per concept, weakest first.
/// GET /reviews/mastery
pub async fn concept_mastery(
    State(state): State<AppState>,
    Learner(learner_id): Learner,
) -> ApiResult<Json<Vec<ConceptMastery>>> {
    Ok(Json(state.engine.reviews().concept_mastery(&learner_id).await?))
}
