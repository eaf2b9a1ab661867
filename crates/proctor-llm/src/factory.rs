//! Factory for creating LLM providers.

use std::sync::Arc;

use proctor_core::config::{LlmProvider, LlmProviderConfig};
use proctor_core::error::ProctorResult;
use proctor_core::traits::{Llm, LlmConfig};

use crate::anthropic::AnthropicLlm;
use crate::gemini::GeminiLlm;
use crate::openai::OpenAIProvider;

/// Factory for creating LLM providers.
pub struct LlmFactory;

impl LlmFactory {
    /// Create an LLM provider from the given configuration.
    pub fn create(provider: LlmProvider, config: LlmConfig) -> ProctorResult<Arc<dyn Llm>> {
        match provider {
            LlmProvider::Gemini => Ok(Arc::new(GeminiLlm::new(config)?)),
            LlmProvider::Anthropic => Ok(Arc::new(AnthropicLlm::new(config)?)),
            LlmProvider::OpenAI => Ok(Arc::new(OpenAIProvider::new(config)?)),
        }
    }

    /// Create the provider named in an engine configuration.
    pub fn from_config(config: &LlmProviderConfig) -> ProctorResult<Arc<dyn Llm>> {
        Self::create(config.provider, config.config.clone())
    }

    /// Create a Gemini LLM provider with a specific model.
    pub fn gemini_with_model(model: impl Into<String>) -> ProctorResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::Gemini, with_model(model))
    }

    /// Create an Anthropic LLM provider with a specific model.
    pub fn anthropic_with_model(model: impl Into<String>) -> ProctorResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::Anthropic, with_model(model))
    }

    /// Create an OpenAI LLM provider with a specific model.
    pub fn openai_with_model(model: impl Into<String>) -> ProctorResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::OpenAI, with_model(model))
    }
}

fn with_model(model: impl Into<String>) -> LlmConfig {
    LlmConfig {
        model: model.into(),
        ..Default::default()
    }
}
