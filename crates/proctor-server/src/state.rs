//! Server state management.

use std::sync::Arc;

use proctor_core::AssessmentEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AssessmentEngine>,
}

impl AppState {
    /// Create a new application state around an engine.
    pub fn new(engine: AssessmentEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
