//! Parsing and schema validation of generated items.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{ErrorCode, ProctorError, ProctorResult};
use crate::types::{GeneratedItem, ItemContent, OPTION_COUNT};

static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("valid regex"));

static THINK_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));

/// Strip thinking tags and code fences around a JSON payload.
pub fn extract_json(text: &str) -> String {
    let text = THINK_TAGS.replace_all(text.trim(), "");
    let text = text.trim();
    match CODE_BLOCK.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim().to_string(),
        None => text.to_string(),
    }
}

/// Raw generator payload. Every field is optional so that missing fields
/// surface as schema errors rather than JSON errors.
#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    scenario: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct_index: Option<i64>,
    #[serde(default)]
    explanation_correct: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    explanation_wrong: Vec<serde_json::Value>,
    #[serde(default)]
    concept_tag: Option<String>,
}

/// Parse an LLM response into a validated item.
pub fn parse_generated_item(response: &str) -> ProctorResult<GeneratedItem> {
    let json = extract_json(response);
    if json.is_empty() {
        return Err(ProctorError::generated_schema("Generator returned an empty response"));
    }

    let raw: RawItem = serde_json::from_str(&json).map_err(|e| ProctorError::Validation {
        message: format!("Generated item is not valid JSON: {}", e),
        code: ErrorCode::ValInvalidJson,
        details: Default::default(),
        suggestion: None,
    })?;

    validate(raw)
}

fn validate(raw: RawItem) -> ProctorResult<GeneratedItem> {
    let question = non_empty(raw.question, "question")?;

    let options = raw
        .options
        .ok_or_else(|| ProctorError::generated_schema("Missing field: options"))?;
    if options.len() != OPTION_COUNT {
        return Err(ProctorError::generated_schema(format!(
            "Expected exactly {} options, got {}",
            OPTION_COUNT,
            options.len()
        )));
    }
    if options.iter().any(|o| o.trim().is_empty()) {
        return Err(ProctorError::generated_schema("One or more options are empty"));
    }

    let correct_index = raw
        .correct_index
        .ok_or_else(|| ProctorError::generated_schema("Missing field: correct_index"))?;
    if !(0..OPTION_COUNT as i64).contains(&correct_index) {
        return Err(ProctorError::generated_schema(format!(
            "correct_index must be 0-{}, got {}",
            OPTION_COUNT - 1,
            correct_index
        )));
    }

    let explanation = raw
        .explanation_correct
        .filter(|e| !e.trim().is_empty())
        .or(raw.explanation);
    let explanation = non_empty(explanation, "explanation")?;
    let concept_tag = non_empty(raw.concept_tag, "concept_tag")?;

    let option_explanations = raw
        .explanation_wrong
        .into_iter()
        .map(|v| v.as_str().map(|s| s.trim().to_string()).unwrap_or_default())
        .collect();

    Ok(GeneratedItem {
        content: ItemContent {
            scenario: raw.scenario.map(|s| s.trim().to_string()).unwrap_or_default(),
            question,
            options: options.into_iter().map(|o| o.trim().to_string()).collect(),
            correct_index: correct_index as usize,
            explanation,
            option_explanations,
        },
        concept_tag,
    })
}

fn non_empty(value: Option<String>, field: &str) -> ProctorResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProctorError::generated_schema(format!("Missing or empty field: {}", field)))
}
