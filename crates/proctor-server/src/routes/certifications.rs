//! Certification catalog endpoint.

use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::state::AppState;
use proctor_core::types::CertificationSummary;

/// List active certifications.
/// GET /certifications
pub async fn list_certifications(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CertificationSummary>>> {
    Ok(Json(state.engine.certifications().await?))
}
