//! Question bank items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rating::DEFAULT_RATING;

/// Number of answer options every item carries.
pub const OPTION_COUNT: usize = 4;

/// Stable, learner-visible payload of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemContent {
    /// Optional scenario preceding the question. Empty when the question is direct.
    #[serde(default)]
    pub scenario: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    /// Per-option rationale, parallel to `options` when present.
    #[serde(default)]
    pub option_explanations: Vec<String>,
}

/// Output of the content generator after schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedItem {
    pub content: ItemContent,
    pub concept_tag: String,
}

/// A question in the item bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub domain_id: String,
    pub certification_id: String,
    pub difficulty_estimate: f64,
    pub content: ItemContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_tag: Option<String>,
    #[serde(default)]
    pub times_answered: u32,
    #[serde(default)]
    pub times_correct: u32,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Create a fresh item with the default difficulty.
    pub fn new(
        domain_id: impl Into<String>,
        certification_id: impl Into<String>,
        content: ItemContent,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            domain_id: domain_id.into(),
            certification_id: certification_id.into(),
            difficulty_estimate: DEFAULT_RATING,
            content,
            concept_tag: None,
            times_answered: 0,
            times_correct: 0,
            created_at: Utc::now(),
        }
    }

    /// Build an item from generator output, cold-started at `difficulty`.
    pub fn from_generated(
        generated: GeneratedItem,
        domain_id: impl Into<String>,
        certification_id: impl Into<String>,
        difficulty: f64,
    ) -> Self {
        let concept_tag = Some(generated.concept_tag).filter(|t| !t.is_empty());
        Self {
            difficulty_estimate: difficulty,
            concept_tag,
            ..Self::new(domain_id, certification_id, generated.content)
        }
    }

    /// Set the difficulty estimate.
    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty_estimate = difficulty;
        self
    }

    /// Set the concept tag.
    pub fn with_concept_tag(mut self, tag: impl Into<String>) -> Self {
        self.concept_tag = Some(tag.into());
        self
    }

    /// Set an explicit id (seeding).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Whether `selected_index` is the correct option.
    pub fn is_correct(&self, selected_index: i32) -> bool {
        selected_index >= 0 && selected_index as usize == self.content.correct_index
    }
}

/// An item joined with its domain, as returned by store view queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub item: Item,
    pub domain_name: String,
    pub domain_weight: f64,
}

/// Item as presented to a learner: no difficulty, no answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentedItem {
    pub item_id: String,
    pub scenario: String,
    pub question: String,
    pub options: Vec<String>,
    pub domain: String,
}

impl From<&ItemView> for PresentedItem {
    fn from(view: &ItemView) -> Self {
        Self {
            item_id: view.item.id.clone(),
            scenario: view.item.content.scenario.clone(),
            question: view.item.content.question.clone(),
            options: view.item.content.options.clone(),
            domain: view.domain_name.clone(),
        }
    }
}

/// Range query against the item bank.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    pub domain_id: String,
    pub min_difficulty: Option<f64>,
    pub max_difficulty: Option<f64>,
    pub exclude_ids: Vec<String>,
    /// Skip items this learner has answered in practice.
    pub unanswered_by: Option<String>,
    pub limit: usize,
}

impl ItemQuery {
    /// Query every item in a domain.
    pub fn domain(domain_id: impl Into<String>, limit: usize) -> Self {
        Self {
            domain_id: domain_id.into(),
            limit,
            ..Default::default()
        }
    }

    /// Restrict to a closed difficulty window.
    pub fn within(mut self, min: f64, max: f64) -> Self {
        self.min_difficulty = Some(min);
        self.max_difficulty = Some(max);
        self
    }

    /// Skip items the learner has already answered.
    pub fn unanswered_by(mut self, learner_id: impl Into<String>) -> Self {
        self.unanswered_by = Some(learner_id.into());
        self
    }

    /// Exclude the given ids.
    pub fn excluding(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.exclude_ids.extend(ids);
        self
    }
}

#[cfg(test)]
pub(crate) fn sample_content(question: &str, correct_index: usize) -> ItemContent {
    ItemContent {
        scenario: String::new(),
        question: question.to_string(),
        options: vec![
            "Option A".to_string(),
            "Option B".to_string(),
            "Option C".to_string(),
            "Option D".to_string(),
        ],
        correct_index,
        explanation: format!("Option {} is correct", correct_index),
        option_explanations: Vec::new(),
    }
}
