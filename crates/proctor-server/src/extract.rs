//! Request extractors.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header carrying the caller's identity, set by the authenticating proxy.
pub const LEARNER_HEADER: &str = "x-learner-id";

/// The learner a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Learner(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Learner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(LEARNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| Learner(v.to_string()))
            .ok_or_else(|| ApiError::unauthorized(format!("Missing {} header", LEARNER_HEADER)))
    }
}
