//! Collaborator traits: stores, content generation, and LLM providers.

mod generator;
mod llm;
mod store;

pub use generator::*;
pub use llm::*;
pub use store::*;
