//! Factory for creating the engine from configuration.

use std::sync::Arc;

use proctor_core::config::EngineConfig;
use proctor_core::error::ProctorResult;
use proctor_core::{AssessmentEngine, LlmContentGenerator, SqliteStore};
use proctor_llm::LlmFactory;
use tracing::info;

/// Open the store, build the configured LLM provider, and wire the engine.
pub fn create_engine(config: EngineConfig) -> ProctorResult<AssessmentEngine> {
    let store = SqliteStore::new(&config.store.path)?;
    let llm = LlmFactory::from_config(&config.llm)?;

    info!(
        store = %config.store.path.display(),
        provider = ?config.llm.provider,
        model = llm.model_name(),
        "Creating assessment engine"
    );

    let generator = LlmContentGenerator::new(llm, config.generator.clone());
    Ok(AssessmentEngine::new(
        config,
        Arc::new(store),
        Arc::new(generator),
    ))
}
