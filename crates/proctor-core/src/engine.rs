//! Engine facade: practice answers, progress, and the component services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{ProctorError, ProctorResult};
use crate::outcome::{run_advisory, AdvisoryRecord, AdvisoryTask};
use crate::rating::{DomainStanding, PassProbabilityEstimator, PassProbabilityInput};
use crate::repetition::ReviewQueue;
use crate::selection::AdaptiveSelector;
use crate::simulation::SimulationManager;
use crate::traits::{AssessmentStore, ContentGenerator, ItemStore, LearnerStore};
use crate::types::{
    percent, AnswerOutcome, AnswerSubmission, Certification, CertificationSummary, Domain,
    DomainProgress, ItemView, PassProbability, PracticeAnswer, PresentedItem, ProgressReport,
    SkillProfile,
};

/// Practice item handed to a learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextQuestion {
    #[serde(flatten)]
    pub item: PresentedItem,
    /// False when the item was generated for this request.
    pub from_cache: bool,
}

/// The adaptive assessment engine.
///
/// Holds one store and one content generator and wires them into the
/// selector, estimator, review queue and simulation manager.
pub struct AssessmentEngine {
    config: EngineConfig,
    store: Arc<dyn AssessmentStore>,
    selector: AdaptiveSelector,
    estimator: PassProbabilityEstimator,
    reviews: ReviewQueue,
    simulations: SimulationManager,
}

impl AssessmentEngine {
    /// Create an engine over the given collaborators.
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn AssessmentStore>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        let simulations = SimulationManager::new(
            store.clone(),
            generator.clone(),
            config.simulation.clone(),
            config.rating.default_rating,
        );
        Self::with_simulations(config, store, generator, simulations)
    }

    /// Create an engine with an explicitly built simulation manager
    /// (e.g. one seeded for reproducible shuffles).
    pub fn with_simulations(
        config: EngineConfig,
        store: Arc<dyn AssessmentStore>,
        generator: Arc<dyn ContentGenerator>,
        simulations: SimulationManager,
    ) -> Self {
        let default_rating = config.rating.default_rating;
        Self {
            selector: AdaptiveSelector::new(
                store.clone(),
                generator,
                config.selection.clone(),
                default_rating,
            ),
            estimator: PassProbabilityEstimator::new(config.estimator.clone(), default_rating),
            reviews: ReviewQueue::new(store.clone(), config.review.clone()),
            simulations,
            store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn AssessmentStore> {
        &self.store
    }

    /// Spaced-repetition queue.
    pub fn reviews(&self) -> &ReviewQueue {
        &self.reviews
    }

    /// Exam simulations.
    pub fn simulations(&self) -> &SimulationManager {
        &self.simulations
    }

    /// Active certifications with their bank sizes.
    pub async fn certifications(&self) -> ProctorResult<Vec<CertificationSummary>> {
        self.store.list_certifications().await
    }

    /// Look up a certification by its exam code.
    pub async fn certification_by_code(&self, code: &str) -> ProctorResult<Certification> {
        self.store
            .get_certification_by_code(code)
            .await?
            .ok_or_else(|| ProctorError::certification_not_found(code))
    }

    /// Next practice item in the learner's weakest domain.
    pub async fn next_question(
        &self,
        learner_id: &str,
        certification_id: &str,
    ) -> ProctorResult<NextQuestion> {
        let selection = self.selector.select_next(learner_id, certification_id).await?;
        Ok(NextQuestion {
            item: PresentedItem::from(&selection.view),
            from_cache: selection.from_cache,
        })
    }

    /// Record a practice answer and update every rating it touches.
    pub async fn submit_answer(
        &self,
        learner_id: &str,
        submission: &AnswerSubmission,
    ) -> ProctorResult<AnswerOutcome> {
        self.submit_answer_at(learner_id, submission, Utc::now()).await
    }

    pub async fn submit_answer_at(
        &self,
        learner_id: &str,
        submission: &AnswerSubmission,
        now: DateTime<Utc>,
    ) -> ProctorResult<AnswerOutcome> {
        let ItemView {
            item, domain_name, ..
        } = self
            .store
            .get_item_view(&submission.item_id)
            .await?
            .ok_or_else(|| ProctorError::item_not_found(&submission.item_id))?;

        let option_count = item.content.options.len();
        if submission.selected_index < 0 || submission.selected_index as usize >= option_count {
            return Err(ProctorError::out_of_range(
                "selected_index",
                submission.selected_index,
                format!("0..{}", option_count),
            ));
        }
        let is_correct = item.is_correct(submission.selected_index);

        // Read before the rating transaction; only the streak fields are used.
        let mut profile = self
            .store
            .get_profile(learner_id)
            .await?
            .unwrap_or_else(|| SkillProfile::new(learner_id));

        let ratings = self
            .store
            .record_practice_answer(
                &PracticeAnswer {
                    learner_id: learner_id.to_string(),
                    item_id: item.id.clone(),
                    selected_index: submission.selected_index,
                    is_correct,
                    time_spent_seconds: submission.time_spent_seconds,
                    answered_at: now,
                },
                &self.config.rating,
            )
            .await?;
        profile.global_skill = ratings.skill_after;

        debug!(
            learner_id = %learner_id,
            item_id = %item.id,
            is_correct,
            expected = ratings.expected,
            skill_before = ratings.skill_before,
            skill_after = ratings.skill_after,
            difficulty_after = ratings.difficulty_after,
            "Applied rating update"
        );

        let advisories = self
            .run_advisories(&mut profile, &item.id, item.concept_tag.as_deref(), is_correct, now)
            .await;

        Ok(AnswerOutcome {
            is_correct,
            correct_index: item.content.correct_index,
            explanation: item.content.explanation,
            skill_before: ratings.skill_before,
            skill_after: ratings.skill_after,
            domain: domain_name,
            domain_skill_after: ratings.domain_skill_after,
            difficulty_after: ratings.difficulty_after,
            advisories,
        })
    }

    async fn run_advisories(
        &self,
        profile: &mut SkillProfile,
        item_id: &str,
        concept_tag: Option<&str>,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Vec<AdvisoryRecord> {
        let today = now.date_naive();
        let learner_id = profile.learner_id.clone();

        let streak = if profile.record_activity(today) {
            self.store.update_streak(profile).await.map(|_| true)
        } else {
            Ok(false)
        };

        let activity = self
            .store
            .record_daily_activity(&learner_id, today, is_correct)
            .await
            .map(|_| true);

        let queued = if is_correct {
            Ok(false)
        } else {
            self.reviews
                .auto_queue_on_miss(&learner_id, item_id, concept_tag)
                .await
        };

        vec![
            run_advisory(AdvisoryTask::StreakUpdate, streak),
            run_advisory(AdvisoryTask::DailyActivity, activity),
            run_advisory(AdvisoryTask::AutoQueueOnMiss, queued),
        ]
    }

    /// Pass probability for one certification.
    pub async fn pass_probability(
        &self,
        learner_id: &str,
        certification_id: &str,
    ) -> ProctorResult<PassProbability> {
        let domains = self.certification_domains(certification_id).await?;
        let profile = self.store.get_profile(learner_id).await?;
        self.estimate(learner_id, certification_id, &domains, profile.as_ref())
            .await
    }

    /// Learner progress within a certification.
    pub async fn progress(
        &self,
        learner_id: &str,
        certification_id: &str,
    ) -> ProctorResult<ProgressReport> {
        let domains = self.certification_domains(certification_id).await?;
        let profile = self
            .store
            .get_profile(learner_id)
            .await?
            .unwrap_or_else(|| SkillProfile {
                global_skill: self.config.rating.default_rating,
                ..SkillProfile::new(learner_id)
            });

        let pass_probability = self
            .estimate(learner_id, certification_id, &domains, Some(&profile))
            .await?;

        let rows: Vec<DomainProgress> = domains
            .iter()
            .map(|domain| {
                let skill = profile.domain_skills.get(&domain.id);
                let answered = skill.map_or(0, |s| s.questions_answered);
                let correct = skill.map_or(0, |s| s.questions_correct);
                DomainProgress {
                    domain_id: domain.id.clone(),
                    domain_name: domain.name.clone(),
                    skill_rating: skill.map_or(self.config.rating.default_rating, |s| s.skill_rating),
                    questions_answered: answered,
                    questions_correct: correct,
                    accuracy: percent(correct, answered),
                }
            })
            .collect();

        let total_questions = rows.iter().map(|d| d.questions_answered).sum();
        let total_correct = rows.iter().map(|d| d.questions_correct).sum();

        Ok(ProgressReport {
            learner_id: learner_id.to_string(),
            global_skill: profile.global_skill,
            total_questions,
            total_correct,
            accuracy: percent(total_correct, total_questions),
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
            pass_probability,
            domains: rows,
        })
    }

    async fn certification_domains(&self, certification_id: &str) -> ProctorResult<Vec<Domain>> {
        self.store
            .get_certification(certification_id)
            .await?
            .ok_or_else(|| ProctorError::certification_not_found(certification_id))?;
        self.store.list_domains(certification_id).await
    }

    async fn estimate(
        &self,
        learner_id: &str,
        certification_id: &str,
        domains: &[Domain],
        profile: Option<&SkillProfile>,
    ) -> ProctorResult<PassProbability> {
        let standings: Vec<DomainStanding> = domains
            .iter()
            .map(|d| DomainStanding {
                name: d.name.clone(),
                weight: d.weight,
                skill_rating: profile.and_then(|p| p.domain_rating(&d.id)),
            })
            .collect();

        let total_questions = profile.map_or(0, |p| {
            domains
                .iter()
                .filter_map(|d| p.domain_skills.get(&d.id))
                .map(|s| s.questions_answered)
                .sum()
        });

        let recent_outcomes = self
            .store
            .recent_outcomes(learner_id, certification_id, self.config.estimator.recent_window)
            .await?;

        let estimate = self.estimator.estimate(&PassProbabilityInput {
            domains: standings,
            total_questions,
            recent_outcomes,
        });

        if estimate.is_active {
            info!(
                learner_id = %learner_id,
                certification_id = %certification_id,
                estimate = estimate.estimate,
                confidence = %estimate.confidence,
                "Estimated pass probability"
            );
        }
        Ok(estimate)
    }
}
