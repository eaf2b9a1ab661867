//! Simulation session lifecycle: Created -> InProgress -> Completed.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::quota::allocate_quotas;
use super::scoring::{score_positions, AnsweredPosition};
use crate::config::SimulationConfig;
use crate::error::{ErrorCode, ProctorError, ProctorResult};
use crate::traits::{
    AssessmentStore, ContentGenerator, GenerationRequest, ItemStore, LearnerStore, SimulationStore,
};
use crate::types::{
    round_to, Certification, Domain, Item, ItemQuery, ItemView, RecordedAnswer, SessionStatus,
    SimulationQuestion, SimulationResult, SimulationSession, SimulationStart, SimulationSummary,
    OPTION_COUNT,
};

/// Assembles, records, and scores timed practice exams.
pub struct SimulationManager {
    store: Arc<dyn AssessmentStore>,
    generator: Arc<dyn ContentGenerator>,
    config: SimulationConfig,
    default_rating: f64,
    rng: Mutex<StdRng>,
}

impl SimulationManager {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        generator: Arc<dyn ContentGenerator>,
        config: SimulationConfig,
        default_rating: f64,
    ) -> Self {
        Self::with_rng(store, generator, config, default_rating, StdRng::from_entropy())
    }

    /// Deterministic shuffles and jitter.
    pub fn with_seed(
        store: Arc<dyn AssessmentStore>,
        generator: Arc<dyn ContentGenerator>,
        config: SimulationConfig,
        default_rating: f64,
        seed: u64,
    ) -> Self {
        Self::with_rng(store, generator, config, default_rating, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        store: Arc<dyn AssessmentStore>,
        generator: Arc<dyn ContentGenerator>,
        config: SimulationConfig,
        default_rating: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            generator,
            config,
            default_rating,
            rng: Mutex::new(rng),
        }
    }

    fn with_random<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> ProctorResult<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| ProctorError::Internal(format!("rng lock poisoned: {e}")))?;
        Ok(f(&mut rng))
    }

    /// Assemble a session and fix its question order.
    pub async fn start(
        &self,
        learner_id: &str,
        certification_id: &str,
    ) -> ProctorResult<SimulationStart> {
        let certification = self
            .store
            .get_certification(certification_id)
            .await?
            .ok_or_else(|| ProctorError::certification_not_found(certification_id))?;

        let domains = self.store.list_domains(certification_id).await?;
        if domains.is_empty() {
            return Err(ProctorError::no_domains(certification_id));
        }

        let weights: Vec<f64> = domains.iter().map(|d| d.weight).collect();
        let quotas = allocate_quotas(&weights, self.config.total_questions);

        let global_skill = self
            .store
            .get_profile(learner_id)
            .await?
            .map(|p| p.global_skill)
            .unwrap_or(self.default_rating);

        let mut order: Vec<ItemView> = Vec::with_capacity(self.config.total_questions);
        for (domain, quota) in domains.iter().zip(quotas) {
            let mut items = self
                .pull_domain_items(&certification, domain, quota, global_skill, learner_id)
                .await?;
            if items.len() < quota {
                warn!(
                    domain = %domain.name,
                    quota,
                    assembled = items.len(),
                    "Simulation domain is short of its quota"
                );
            }
            self.with_random(|rng| items.shuffle(rng))?;
            order.extend(items.into_iter().map(|item| ItemView {
                item,
                domain_name: domain.name.clone(),
                domain_weight: domain.weight,
            }));
        }
        self.with_random(|rng| order.shuffle(rng))?;

        if order.is_empty() {
            return Err(ProctorError::generator(format!(
                "No items could be assembled for certification '{}'",
                certification_id
            )));
        }

        let session = SimulationSession {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            certification_id: certification_id.to_string(),
            question_order: order.iter().map(|v| v.item.id.clone()).collect(),
            answers: Default::default(),
            status: SessionStatus::Created,
            started_at: Utc::now(),
            ended_at: None,
            result: None,
        };
        self.store.insert_session(&session).await?;

        info!(
            learner_id = %learner_id,
            session_id = %session.id,
            questions = order.len(),
            "Started simulation"
        );

        let questions = order
            .iter()
            .enumerate()
            .map(|(index, view)| SimulationQuestion {
                item_id: view.item.id.clone(),
                index,
                scenario: view.item.content.scenario.clone(),
                question: view.item.content.question.clone(),
                options: view.item.content.options.clone(),
                domain: view.domain_name.clone(),
            })
            .collect();

        Ok(SimulationStart {
            session_id: session.id,
            total_questions: order.len(),
            questions,
            time_limit_minutes: self.config.time_limit_minutes,
            time_limit_seconds: self.config.time_limit_minutes * 60,
        })
    }

    /// Up to `quota` items: unseen first, then previously answered, then generated.
    async fn pull_domain_items(
        &self,
        certification: &Certification,
        domain: &Domain,
        quota: usize,
        global_skill: f64,
        learner_id: &str,
    ) -> ProctorResult<Vec<Item>> {
        if quota == 0 {
            return Ok(Vec::new());
        }

        let mut items = self
            .store
            .find_items(&ItemQuery::domain(&domain.id, quota).unanswered_by(learner_id))
            .await?;

        if items.len() < quota {
            let chosen: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
            let seen = self
                .store
                .find_items(&ItemQuery::domain(&domain.id, quota - items.len()).excluding(chosen))
                .await?;
            items.extend(seen);
        }

        let shortfall = quota.saturating_sub(items.len());
        let jitter = self.config.difficulty_jitter.abs();
        for attempt in 0..shortfall {
            if items.len() >= quota {
                break;
            }
            let offset = self.with_random(|rng| rng.gen_range(-jitter..=jitter))?;
            let request = GenerationRequest::new(
                certification.display_name(),
                &domain.name,
                global_skill + f64::from(offset),
            );
            match self.generator.generate(&request).await {
                Ok(generated) => {
                    let item =
                        Item::from_generated(generated, &domain.id, &certification.id, global_skill);
                    self.store.insert_item(&item).await?;
                    items.push(item);
                }
                Err(e) => {
                    warn!(
                        domain = %domain.name,
                        attempt = attempt + 1,
                        error = %e,
                        "Generation failed while filling simulation"
                    );
                }
            }
        }

        debug!(
            domain = %domain.name,
            quota,
            assembled = items.len(),
            "Pulled simulation items"
        );
        Ok(items)
    }

    /// Record (or overwrite) the answer at one position. No feedback is returned.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        learner_id: &str,
        index: usize,
        item_id: &str,
        selected_index: i32,
        time_spent_seconds: Option<u32>,
    ) -> ProctorResult<()> {
        let session = self.load(session_id, learner_id).await?;
        if session.is_complete() {
            return Err(completed(session_id));
        }

        let len = session.question_order.len();
        match session.question_order.get(index) {
            None => {
                return Err(ProctorError::out_of_range(
                    "question_index",
                    index,
                    format!("0..{}", len),
                ))
            }
            Some(expected) if expected != item_id => {
                return Err(ProctorError::validation(format!(
                    "Item '{}' is not at position {} of session '{}'",
                    item_id, index, session_id
                )))
            }
            Some(_) => {}
        }
        if !(0..OPTION_COUNT as i32).contains(&selected_index) {
            return Err(ProctorError::out_of_range(
                "selected_index",
                selected_index,
                format!("0..{}", OPTION_COUNT),
            ));
        }

        let answer = RecordedAnswer {
            item_id: item_id.to_string(),
            selected_index,
            time_spent_seconds,
        };
        self.store.record_answer(session_id, index, &answer).await
    }

    /// Score the session and close it. Only the first call succeeds.
    pub async fn complete(
        &self,
        session_id: &str,
        learner_id: &str,
    ) -> ProctorResult<SimulationResult> {
        let session = self.load(session_id, learner_id).await?;
        if session.is_complete() {
            return Err(completed(session_id));
        }

        let mut views = Vec::with_capacity(session.question_order.len());
        for (index, item_id) in session.question_order.iter().enumerate() {
            match self.store.get_item_view(item_id).await? {
                Some(view) => views.push((index, view)),
                None => warn!(
                    session_id = %session_id,
                    item_id = %item_id,
                    "Simulation item no longer exists; skipping"
                ),
            }
        }

        let positions: Vec<AnsweredPosition<'_>> = views
            .iter()
            .map(|(index, view)| AnsweredPosition {
                index: *index,
                view,
                selected_index: session
                    .answers
                    .get(index)
                    .map(|a| a.selected_index)
                    .unwrap_or(-1),
            })
            .collect();
        let card = score_positions(&positions, self.config.max_score);

        let ended_at = Utc::now();
        let minutes = (ended_at - session.started_at).num_milliseconds() as f64 / 60_000.0;
        let result = SimulationResult {
            session_id: session_id.to_string(),
            score: card.score,
            is_passed: card.score >= self.config.pass_score,
            pass_threshold: self.config.pass_score,
            total_questions: card.total_questions,
            correct_answers: card.correct_answers,
            accuracy: card.accuracy(),
            time_taken_minutes: round_to(minutes.max(0.0), 1),
            domain_results: card.domain_results,
            question_results: card.question_results,
        };

        if !self
            .store
            .complete_session(session_id, &result, ended_at)
            .await?
        {
            return Err(completed(session_id));
        }

        info!(
            learner_id = %learner_id,
            session_id = %session_id,
            score = result.score,
            passed = result.is_passed,
            "Completed simulation"
        );
        Ok(result)
    }

    /// Stored result of a completed session.
    pub async fn results(
        &self,
        session_id: &str,
        learner_id: &str,
    ) -> ProctorResult<SimulationResult> {
        let session = self.load(session_id, learner_id).await?;
        match (session.status, session.result) {
            (SessionStatus::Completed, Some(result)) => Ok(result),
            _ => Err(ProctorError::state(
                ErrorCode::StateSessionOpen,
                format!("Simulation session '{}' is not completed yet", session_id),
            )),
        }
    }

    /// Completed sessions, newest first.
    pub async fn history(&self, learner_id: &str) -> ProctorResult<Vec<SimulationSummary>> {
        self.store
            .list_completed_sessions(learner_id, self.config.history_limit)
            .await
    }

    /// A session owned by `learner_id`. Other learners' sessions read as missing.
    async fn load(&self, session_id: &str, learner_id: &str) -> ProctorResult<SimulationSession> {
        self.store
            .get_session(session_id)
            .await?
            .filter(|s| s.learner_id == learner_id)
            .ok_or_else(|| ProctorError::session_not_found(session_id))
    }
}

fn completed(session_id: &str) -> ProctorError {
    ProctorError::state(
        ErrorCode::StateSessionCompleted,
        format!("Simulation session '{}' is already completed", session_id),
    )
}
