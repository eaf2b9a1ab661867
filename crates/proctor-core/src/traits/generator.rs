//! Content generator seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProctorResult;
use crate::types::GeneratedItem;

/// What to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub certification_name: String,
    pub domain_name: String,
    pub target_difficulty: f64,
}

impl GenerationRequest {
    pub fn new(
        certification_name: impl Into<String>,
        domain_name: impl Into<String>,
        target_difficulty: f64,
    ) -> Self {
        Self {
            certification_name: certification_name.into(),
            domain_name: domain_name.into(),
            target_difficulty,
        }
    }
}

/// Produces new items on demand.
///
/// Implementations must return schema-valid items only: four options,
/// a correct index in range, non-empty question and explanation, and a
/// concept tag. Anything else is a `Validation` error. Unreachable or slow
/// backends surface as `TransientIo`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> ProctorResult<GeneratedItem>;
}
