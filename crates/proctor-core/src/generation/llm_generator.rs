//! Content generator backed by an LLM provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::parser::parse_generated_item;
use super::prompts::{item_generation_prompt, ITEM_WRITER_SYSTEM_PROMPT};
use crate::config::GeneratorConfig;
use crate::error::{ProctorError, ProctorResult};
use crate::traits::{ContentGenerator, GenerationOptions, GenerationRequest, Llm, ResponseFormat};
use crate::types::{GeneratedItem, Message};

/// Generates items by prompting an [`Llm`] and validating its JSON answer.
pub struct LlmContentGenerator {
    llm: Arc<dyn Llm>,
    config: GeneratorConfig,
}

impl LlmContentGenerator {
    pub fn new(llm: Arc<dyn Llm>, config: GeneratorConfig) -> Self {
        Self { llm, config }
    }

    fn options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            top_p: Some(self.config.top_p),
            response_format: self
                .llm
                .supports_json_mode()
                .then_some(ResponseFormat::Json),
        }
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn generate(&self, request: &GenerationRequest) -> ProctorResult<GeneratedItem> {
        let messages = vec![
            Message::system(ITEM_WRITER_SYSTEM_PROMPT),
            Message::user(item_generation_prompt(request)),
        ];

        debug!(
            model = self.llm.model_name(),
            domain = %request.domain_name,
            difficulty = request.target_difficulty,
            "Generating item"
        );

        let timeout = self.config.timeout();
        let response = tokio::time::timeout(timeout, self.llm.generate(&messages, Some(self.options())))
            .await
            .map_err(|_| {
                ProctorError::timeout(format!(
                    "Content generator did not answer within {}s",
                    timeout.as_secs()
                ))
            })??;

        parse_generated_item(response.content_or_empty()).map_err(|e| {
            warn!(
                model = self.llm.model_name(),
                domain = %request.domain_name,
                error = %e,
                "Rejected generated item"
            );
            e
        })
    }
}
