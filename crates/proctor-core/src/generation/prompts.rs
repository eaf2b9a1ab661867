//! Prompt templates for item generation.

use crate::traits::GenerationRequest;

/// System prompt shared by every generation call.
pub const ITEM_WRITER_SYSTEM_PROMPT: &str = "You write certification exam questions. \
You answer with a single JSON object and nothing else.";

/// Prompt asking for one item at the requested domain and difficulty.
pub fn item_generation_prompt(request: &GenerationRequest) -> String {
    format!(
        r#"You are generating a {cert} certification exam question.

Constraints:
- Domain: {domain}
- Difficulty Rating: {difficulty:.0} (1000=medium baseline, higher=harder)
- 4 answer options, 1 correct answer
- Scenario-based where appropriate
- No ambiguous wording
- Professional tone, realistic vendor-style question

Return JSON ONLY in this exact format (no markdown, no code fences):

{{"scenario": "A brief scenario/context (1-3 sentences). Leave empty string if question is direct.", "question": "The actual question prompt", "options": ["Option A", "Option B", "Option C", "Option D"], "correct_index": 0, "explanation_correct": "Why the correct answer is right", "explanation_wrong": ["Why A is wrong or correct", "Why B is wrong or correct", "Why C is wrong or correct", "Why D is wrong or correct"], "concept_tag": "Primary concept being tested", "domain": "{domain}"}}"#,
        cert = request.certification_name,
        domain = request.domain_name,
        difficulty = request.target_difficulty,
    )
}
