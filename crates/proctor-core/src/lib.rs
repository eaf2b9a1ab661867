//! proctor-core - Core library for proctor.
//!
//! This crate provides the data model, collaborator traits, and the
//! adaptive assessment engine: ELO ratings, pass-probability estimation,
//! weakest-domain item selection, SM-2 review scheduling, and timed exam
//! simulations.
//!
//! # Example
//!
//! ```ignore
//! use proctor_core::{AssessmentEngine, EngineConfig, SqliteStore};
//!
//! let store = Arc::new(SqliteStore::new("proctor.db")?);
//! let engine = AssessmentEngine::new(EngineConfig::default(), store, generator);
//!
//! let next = engine.next_question("learner-1", "pl-300").await?;
//! let outcome = engine.submit_answer("learner-1", &AnswerSubmission {
//!     item_id: next.item.item_id,
//!     selected_index: 2,
//!     time_spent_seconds: Some(40),
//! }).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod outcome;
pub mod rating;
pub mod repetition;
pub mod selection;
pub mod simulation;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{EngineConfig, LlmProvider, LlmProviderConfig};
pub use engine::{AssessmentEngine, NextQuestion};
pub use error::{ErrorCode, ProctorError, ProctorResult};
pub use generation::LlmContentGenerator;
pub use outcome::{AdvisoryOutcome, AdvisoryRecord, AdvisoryTask};
pub use rating::{expected_score, update_ratings, PassProbabilityEstimator};
pub use repetition::{ReviewQueue, ReviewScheduler};
pub use selection::AdaptiveSelector;
pub use simulation::SimulationManager;
pub use store::SqliteStore;
pub use traits::{
    AssessmentStore, ContentGenerator, GenerationRequest, Llm, LlmConfig, LlmResponse,
};
pub use types::{
    AnswerOutcome, AnswerSubmission, Certification, Domain, GeneratedItem, Item, ItemContent,
    Message, MessageRole, PassProbability, ProgressReport, ReviewEntry, ReviewSource,
    SimulationResult, SimulationStart,
};
