//! Google Gemini LLM provider implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use proctor_core::error::{ProctorError, ProctorResult};
use proctor_core::traits::{
    GenerationOptions, Llm, LlmConfig, LlmResponse, ResponseFormat, TokenUsage,
};
use proctor_core::types::{Message, MessageRole};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini LLM provider.
pub struct GeminiLlm {
    client: Client,
    config: LlmConfig,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Set on reasoning parts of thinking models.
    #[serde(default, skip_serializing)]
    thought: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiLlm {
    /// Create a new Gemini LLM provider.
    pub fn new(config: LlmConfig) -> ProctorResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                ProctorError::Configuration("Gemini API key not found. Set GEMINI_API_KEY environment variable or provide api_key in config.".to_string())
            })?;

        let client = Client::builder().build().map_err(|e| {
            ProctorError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_API_URL.to_string());

        let mut config = config;
        if config.model.is_empty() {
            config.model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            client,
            config,
            api_key,
            base_url,
        })
    }

    fn build_request(&self, messages: &[Message], options: &GenerationOptions) -> GeminiRequest {
        let system_instruction = messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| GeminiContent {
                role: None,
                parts: vec![text_part(&m.content)],
            });

        let contents = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        MessageRole::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![text_part(&m.content)],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature.unwrap_or(self.config.temperature),
                max_output_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
                top_p: options.top_p.unwrap_or(self.config.top_p),
                response_mime_type: (options.response_format == Some(ResponseFormat::Json))
                    .then_some("application/json"),
            },
        }
    }
}

fn text_part(text: &str) -> GeminiPart {
    GeminiPart {
        text: Some(text.to_string()),
        thought: false,
    }
}

/// Text of the first candidate, skipping reasoning parts.
///
/// Thinking models may emit several parts; the answer is the last
/// non-thought part with text.
fn answer_text(response: &GeminiResponse) -> Option<String> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .rev()
        .filter(|p| !p.thought)
        .find_map(|p| p.text.clone().filter(|t| !t.trim().is_empty()))
}

#[async_trait]
impl Llm for GeminiLlm {
    async fn generate(
        &self,
        messages: &[Message],
        options: Option<GenerationOptions>,
    ) -> ProctorResult<LlmResponse> {
        let options = options.unwrap_or_default();
        let request = self.build_request(messages, &options);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.config.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProctorError::generator(format!("Gemini API request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProctorError::generator(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let error: Result<GeminiError, _> = serde_json::from_str(&body);
            let message = error
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.clone());
            return Err(ProctorError::generator(format!(
                "Gemini API error ({}): {}",
                status, message
            )));
        }

        let response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| ProctorError::generator(format!("Failed to parse response: {}", e)))?;

        let content = answer_text(&response);
        if content.is_none() {
            debug!(model = %self.config.model, "Gemini returned no answer text");
        }

        let usage = response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(LlmResponse { content, usage })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiLlm {
        GeminiLlm::new(LlmConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let llm = provider();
        assert_eq!(llm.model_name(), DEFAULT_MODEL);

        let messages = [Message::system("Answer in JSON"), Message::user("Write a question")];
        let options = GenerationOptions {
            response_format: Some(ResponseFormat::Json),
            ..Default::default()
        };
        let json = serde_json::to_value(llm.build_request(&messages, &options)).unwrap();

        assert_eq!(json["contents"].as_array().unwrap().len(), 1);
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Write a question");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Answer in JSON");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert!(json["contents"][0]["parts"][0].get("thought").is_none());
    }

    #[test]
    fn test_answer_skips_thought_parts() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "{\"question\": \"draft\"}"},
                        {"text": "{\"question\": \"final\"}"},
                        {"text": "Thinking about distractors...", "thought": true}
                    ]
                }
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 20, "totalTokenCount": 30}
        }))
        .unwrap();

        assert_eq!(answer_text(&response).unwrap(), "{\"question\": \"final\"}");
        assert_eq!(response.usage_metadata.unwrap().total_token_count, 30);
    }

    #[test]
    fn test_empty_candidates() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(answer_text(&response).is_none());
    }
}
