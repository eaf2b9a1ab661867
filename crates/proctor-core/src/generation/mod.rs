//! LLM-backed item generation: prompt, call, validate.

mod llm_generator;
mod parser;
mod prompts;

pub use llm_generator::LlmContentGenerator;
pub use parser::{extract_json, parse_generated_item};
pub use prompts::{item_generation_prompt, ITEM_WRITER_SYSTEM_PROMPT};
