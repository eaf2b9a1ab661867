//! Storage collaborator traits.
//!
//! Components hold an `Arc<dyn AssessmentStore>` (or a narrower trait) and
//! never reach for a global handle. Row-level atomicity is the store's job:
//! practice answers are recorded in one transaction, review inserts report
//! whether a row was created, session answers are upserted by position, and
//! session completion is a compare-and-set.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::config::RatingConfig;
use crate::error::ProctorResult;
use crate::types::{
    Certification, CertificationSummary, Domain, DueReview, Item, ItemQuery, ItemView,
    PracticeAnswer, PracticeRatings, RecordedAnswer, ReviewEntry, SimulationResult,
    SimulationSession, SimulationSummary, SkillProfile,
};

/// Certification catalog and question bank.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Active certifications with their bank sizes.
    async fn list_certifications(&self) -> ProctorResult<Vec<CertificationSummary>>;

    async fn get_certification(&self, id: &str) -> ProctorResult<Option<Certification>>;

    async fn get_certification_by_code(&self, code: &str) -> ProctorResult<Option<Certification>>;

    /// Domains of a certification in sort order.
    async fn list_domains(&self, certification_id: &str) -> ProctorResult<Vec<Domain>>;

    async fn get_item(&self, id: &str) -> ProctorResult<Option<Item>>;

    /// Item joined with its domain name and weight.
    async fn get_item_view(&self, id: &str) -> ProctorResult<Option<ItemView>>;

    /// Items matching a domain/difficulty query, oldest first.
    async fn find_items(&self, query: &ItemQuery) -> ProctorResult<Vec<Item>>;

    async fn insert_item(&self, item: &Item) -> ProctorResult<()>;
}

/// Learner skill profiles and answer history.
#[async_trait]
pub trait LearnerStore: Send + Sync {
    /// Profile with all domain rows, if the learner has answered anything.
    async fn get_profile(&self, learner_id: &str) -> ProctorResult<Option<SkillProfile>>;

    /// Persist the streak fields of a profile.
    async fn update_streak(&self, profile: &SkillProfile) -> ProctorResult<()>;

    /// Record a practice answer as one transaction.
    ///
    /// Reads the learner's global and domain skill (defaulting to
    /// `rating.default_rating`) and the item difficulty, applies the rating
    /// exchange to both skills against that difficulty, then writes the
    /// profile, the domain row, the item and the response together. On error
    /// nothing is written.
    async fn record_practice_answer(
        &self,
        answer: &PracticeAnswer,
        rating: &RatingConfig,
    ) -> ProctorResult<PracticeRatings>;

    /// Most recent practice outcomes within a certification, newest first.
    async fn recent_outcomes(
        &self,
        learner_id: &str,
        certification_id: &str,
        limit: usize,
    ) -> ProctorResult<Vec<bool>>;

    /// Add one answer to the learner's per-day tally.
    async fn record_daily_activity(
        &self,
        learner_id: &str,
        date: NaiveDate,
        correct: bool,
    ) -> ProctorResult<()>;
}

/// Spaced-repetition entries keyed by (learner, item).
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn get_review(&self, learner_id: &str, item_id: &str)
        -> ProctorResult<Option<ReviewEntry>>;

    /// Insert unless an entry exists. Returns true when a row was created.
    async fn insert_review(&self, entry: &ReviewEntry) -> ProctorResult<bool>;

    async fn update_review(&self, entry: &ReviewEntry) -> ProctorResult<()>;

    /// Entries due at `now`, earliest first, joined with their items.
    async fn due_reviews(
        &self,
        learner_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> ProctorResult<Vec<DueReview>>;

    /// Every entry of a learner.
    async fn list_reviews(&self, learner_id: &str) -> ProctorResult<Vec<ReviewEntry>>;

    /// Returns true when an entry was deleted.
    async fn delete_review(&self, learner_id: &str, item_id: &str) -> ProctorResult<bool>;
}

/// Simulation sessions.
#[async_trait]
pub trait SimulationStore: Send + Sync {
    async fn insert_session(&self, session: &SimulationSession) -> ProctorResult<()>;

    /// Session with its recorded answers.
    async fn get_session(&self, session_id: &str) -> ProctorResult<Option<SimulationSession>>;

    /// Upsert the answer at `index` and mark the session in progress.
    ///
    /// Fails with a state error if the session is already completed.
    async fn record_answer(
        &self,
        session_id: &str,
        index: usize,
        answer: &RecordedAnswer,
    ) -> ProctorResult<()>;

    /// Mark the session completed with its result.
    ///
    /// Returns false if the session was already completed.
    async fn complete_session(
        &self,
        session_id: &str,
        result: &SimulationResult,
        ended_at: DateTime<Utc>,
    ) -> ProctorResult<bool>;

    /// Completed sessions of a learner, newest first.
    async fn list_completed_sessions(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> ProctorResult<Vec<SimulationSummary>>;
}

/// Every store capability the engine needs.
pub trait AssessmentStore: ItemStore + LearnerStore + ReviewStore + SimulationStore {}

impl<T> AssessmentStore for T where T: ItemStore + LearnerStore + ReviewStore + SimulationStore {}
