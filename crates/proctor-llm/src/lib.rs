//! proctor-llm - LLM provider implementations for proctor.
//!
//! Each provider implements the core [`Llm`] trait so it can back an
//! `LlmContentGenerator`.
//!
//! # Supported Providers
//!
//! - **Gemini** (default) - Google Generative Language API
//! - **Anthropic** - Claude models via the Messages API
//! - **OpenAI** (feature: `openai`) - chat completions, including compatible endpoints
//!
//! # Example
//!
//! ```ignore
//! use proctor_llm::LlmFactory;
//!
//! let llm = LlmFactory::gemini_with_model("gemini-1.5-flash")?;
//! let generator = LlmContentGenerator::new(llm, GeneratorConfig::default());
//! ```

mod anthropic;
mod factory;
mod gemini;
mod openai;

pub use anthropic::AnthropicLlm;
pub use factory::LlmFactory;
pub use gemini::GeminiLlm;
pub use openai::OpenAIProvider;

// Re-export core types for convenience
pub use proctor_core::config::LlmProvider;
pub use proctor_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse, ResponseFormat};
