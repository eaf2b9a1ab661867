//! Domain-weighted pass-probability estimation.

use std::collections::BTreeMap;
use tracing::debug;

use super::elo::expected_score;
use crate::config::EstimatorConfig;
use crate::types::{round_to, Confidence, PassProbability};

/// A certification domain as seen by the estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainStanding {
    pub name: String,
    pub weight: f64,
    /// Learner rating in the domain; `None` if never attempted.
    pub skill_rating: Option<f64>,
}

/// Everything the estimator needs about one learner.
#[derive(Debug, Clone, Default)]
pub struct PassProbabilityInput {
    /// One entry per domain of the certification.
    pub domains: Vec<DomainStanding>,
    pub total_questions: u32,
    /// Most recent outcomes, newest first. Only the configured window is read.
    pub recent_outcomes: Vec<bool>,
}

/// Estimates the chance of passing the real exam.
#[derive(Debug, Clone)]
pub struct PassProbabilityEstimator {
    config: EstimatorConfig,
    default_rating: f64,
}

impl PassProbabilityEstimator {
    pub fn new(config: EstimatorConfig, default_rating: f64) -> Self {
        Self {
            config,
            default_rating,
        }
    }

    /// Compute the estimate.
    ///
    /// Below the minimum answered count the result is inactive with a zero
    /// estimate, regardless of the domain ratings.
    pub fn estimate(&self, input: &PassProbabilityInput) -> PassProbability {
        let total = input.total_questions;
        if total < self.config.min_questions {
            return PassProbability {
                estimate: 0.0,
                confidence: Confidence::Low,
                is_active: false,
                questions_remaining: self.config.min_questions - total,
                domain_contributions: BTreeMap::new(),
            };
        }

        let weighted_skill = self.weighted_skill(&input.domains);
        let target = self.config.pass_threshold - self.config.threshold_offset;
        let base = expected_score(weighted_skill, target);

        let recent: Vec<bool> = input
            .recent_outcomes
            .iter()
            .copied()
            .take(self.config.recent_window)
            .collect();
        let adjusted = if recent.is_empty() {
            base
        } else {
            let accuracy = recent.iter().filter(|c| **c).count() as f64 / recent.len() as f64;
            (1.0 - self.config.recent_weight) * base + self.config.recent_weight * accuracy
        };

        let estimate = round_to((adjusted * 100.0).clamp(0.0, self.config.max_estimate), 1);

        debug!(
            weighted_skill,
            base_probability = base,
            recent = recent.len(),
            estimate,
            "Computed pass probability"
        );

        PassProbability {
            estimate,
            confidence: self.confidence(total),
            is_active: true,
            questions_remaining: 0,
            domain_contributions: input
                .domains
                .iter()
                .map(|d| {
                    let skill = d.skill_rating.unwrap_or(self.default_rating);
                    (d.name.clone(), skill.round() as i64)
                })
                .collect(),
        }
    }

    fn weighted_skill(&self, domains: &[DomainStanding]) -> f64 {
        let total_weight: f64 = domains.iter().map(|d| d.weight).sum();
        if total_weight <= 0.0 {
            return self.default_rating;
        }
        domains
            .iter()
            .map(|d| d.weight * d.skill_rating.unwrap_or(self.default_rating))
            .sum::<f64>()
            / total_weight
    }

    fn confidence(&self, total: u32) -> Confidence {
        if total >= self.config.high_confidence_at {
            Confidence::High
        } else if total >= self.config.medium_confidence_at {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl Default for PassProbabilityEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default(), super::DEFAULT_RATING)
    }
}
