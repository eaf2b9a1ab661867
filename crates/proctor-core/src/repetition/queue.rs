//! Review queue service over a [`ReviewStore`](crate::traits::ReviewStore).

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::scheduler::ReviewScheduler;
use crate::config::ReviewConfig;
use crate::error::{ErrorCode, ProctorError, ProctorResult};
use crate::store::UNTAGGED_CONCEPT;
use crate::traits::{AssessmentStore, ItemStore, ReviewStore};
use crate::types::{round_to, ConceptMastery, DueReview, ReviewEntry, ReviewSource};

/// Per-learner spaced repetition of missed or bookmarked items.
///
/// Entries are never deleted automatically; they stay as review history
/// until the learner removes them.
pub struct ReviewQueue {
    store: Arc<dyn AssessmentStore>,
    scheduler: ReviewScheduler,
}

impl ReviewQueue {
    pub fn new(store: Arc<dyn AssessmentStore>, config: ReviewConfig) -> Self {
        Self {
            store,
            scheduler: ReviewScheduler::new(config),
        }
    }

    /// Add an item to the queue.
    ///
    /// Returns false if the learner already has an entry for it. Without an
    /// explicit tag the item's own concept tag is used.
    pub async fn enqueue(
        &self,
        learner_id: &str,
        item_id: &str,
        concept_tag: Option<&str>,
        source: ReviewSource,
    ) -> ProctorResult<bool> {
        self.enqueue_at(learner_id, item_id, concept_tag, source, Utc::now())
            .await
    }

    pub async fn enqueue_at(
        &self,
        learner_id: &str,
        item_id: &str,
        concept_tag: Option<&str>,
        source: ReviewSource,
        now: DateTime<Utc>,
    ) -> ProctorResult<bool> {
        let concept_tag = match concept_tag.filter(|t| !t.is_empty()) {
            Some(tag) => Some(tag.to_string()),
            None => {
                self.store
                    .get_item(item_id)
                    .await?
                    .ok_or_else(|| ProctorError::item_not_found(item_id))?
                    .concept_tag
            }
        };

        let entry = self
            .scheduler
            .new_entry(learner_id, item_id, concept_tag, source, now);
        let inserted = self.store.insert_review(&entry).await?;

        debug!(
            learner_id = %learner_id,
            item_id = %item_id,
            source = %source,
            inserted,
            "Enqueued review"
        );
        Ok(inserted)
    }

    /// Queue an item the learner just missed.
    ///
    /// Callers treat errors from this as advisory.
    pub async fn auto_queue_on_miss(
        &self,
        learner_id: &str,
        item_id: &str,
        concept_tag: Option<&str>,
    ) -> ProctorResult<bool> {
        self.enqueue(learner_id, item_id, concept_tag, ReviewSource::Auto)
            .await
    }

    /// Apply a review outcome and reschedule.
    pub async fn record_review(
        &self,
        learner_id: &str,
        item_id: &str,
        correct: bool,
    ) -> ProctorResult<ReviewEntry> {
        self.record_review_at(learner_id, item_id, correct, Utc::now())
            .await
    }

    pub async fn record_review_at(
        &self,
        learner_id: &str,
        item_id: &str,
        correct: bool,
        now: DateTime<Utc>,
    ) -> ProctorResult<ReviewEntry> {
        let entry = self
            .store
            .get_review(learner_id, item_id)
            .await?
            .ok_or_else(|| ProctorError::not_found(ErrorCode::NfReview, "Review entry", item_id))?;

        let updated = self.scheduler.review(&entry, correct, now);
        self.store.update_review(&updated).await?;

        debug!(
            learner_id = %learner_id,
            item_id = %item_id,
            correct,
            interval_hours = updated.interval_hours,
            ease_factor = updated.ease_factor,
            "Recorded review"
        );
        Ok(updated)
    }

    /// Entries due now, earliest first. `None` uses the configured limit.
    pub async fn due_reviews(
        &self,
        learner_id: &str,
        limit: Option<usize>,
    ) -> ProctorResult<Vec<DueReview>> {
        self.due_reviews_at(learner_id, limit, Utc::now()).await
    }

    pub async fn due_reviews_at(
        &self,
        learner_id: &str,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> ProctorResult<Vec<DueReview>> {
        let limit = limit.unwrap_or(self.scheduler.config().due_limit);
        self.store.due_reviews(learner_id, now, limit).await
    }

    /// Mastery grouped by concept tag, weakest concept first.
    pub async fn concept_mastery(&self, learner_id: &str) -> ProctorResult<Vec<ConceptMastery>> {
        let entries = self.store.list_reviews(learner_id).await?;
        Ok(group_by_concept(&entries))
    }

    /// Delete an entry. Returns false if there was none.
    pub async fn remove(&self, learner_id: &str, item_id: &str) -> ProctorResult<bool> {
        self.store.delete_review(learner_id, item_id).await
    }
}

fn group_by_concept(entries: &[ReviewEntry]) -> Vec<ConceptMastery> {
    let mut groups: BTreeMap<String, (f64, u32, Option<DateTime<Utc>>)> = BTreeMap::new();
    for entry in entries {
        let tag = entry
            .concept_tag
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTAGGED_CONCEPT.to_string());
        let group = groups.entry(tag).or_insert((0.0, 0, None));
        group.0 += entry.mastery_score;
        group.1 += 1;
        group.2 = group.2.max(Some(entry.updated_at));
    }

    let mut concepts: Vec<ConceptMastery> = groups
        .into_iter()
        .map(|(concept_tag, (sum, count, last_reviewed))| ConceptMastery {
            concept_tag,
            mastery_score: round_to(sum / f64::from(count), 3),
            item_count: count,
            last_reviewed,
        })
        .collect();
    concepts.sort_by(|a, b| a.mastery_score.total_cmp(&b.mastery_score));
    concepts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repetition::scheduler::latest_due;
    use crate::store::SqliteStore;
    use crate::types::{sample_content, Certification, Domain, Item};
    use chrono::Duration;

    async fn queue() -> (ReviewQueue, Arc<SqliteStore>) {
        let store = SqliteStore::in_memory().unwrap();
        store
            .insert_certification(&Certification::new("c1", "AZ-900", "Azure Fundamentals"))
            .unwrap();
        store
            .insert_domain(&Domain::new("d1", "c1", "Cloud Concepts", 1.0, 1))
            .unwrap();
        for (id, tag) in [("q1", Some("Elasticity")), ("q2", Some("Elasticity")), ("q3", None)] {
            let mut item = Item::new("d1", "c1", sample_content(id, 0)).with_id(id);
            item.concept_tag = tag.map(String::from);
            store.insert_item(&item).await.unwrap();
        }
        let store = Arc::new(store);
        (
            ReviewQueue::new(store.clone(), ReviewConfig::default()),
            store,
        )
    }

    #[tokio::test]
    async fn test_enqueue_never_duplicates() {
        let (queue, store) = queue().await;
        assert!(queue
            .enqueue("u1", "q1", None, ReviewSource::Manual)
            .await
            .unwrap());
        assert!(!queue.auto_queue_on_miss("u1", "q1", None).await.unwrap());

        let entries = store.list_reviews("u1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, ReviewSource::Manual);
        assert_eq!(entries[0].concept_tag.as_deref(), Some("Elasticity"));
    }

    #[tokio::test]
    async fn test_enqueue_unknown_item() {
        let (queue, _) = queue().await;
        let err = queue
            .enqueue("u1", "missing", None, ReviewSource::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, ProctorError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_due_reviews_order_and_limit() {
        let (queue, _) = queue().await;
        let start = Utc::now() - Duration::hours(100);
        queue
            .enqueue_at("u1", "q2", None, ReviewSource::Auto, start + Duration::hours(2))
            .await
            .unwrap();
        queue
            .enqueue_at("u1", "q1", None, ReviewSource::Auto, start)
            .await
            .unwrap();
        queue
            .enqueue_at("u1", "q3", None, ReviewSource::Auto, Utc::now())
            .await
            .unwrap();

        let due = queue.due_reviews("u1", None).await.unwrap();
        assert_eq!(
            due.iter().map(|d| d.item_id.as_str()).collect::<Vec<_>>(),
            vec!["q1", "q2"]
        );

        let capped = queue.due_reviews("u1", Some(1)).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].item_id, "q1");
    }

    #[tokio::test]
    async fn test_record_review_reschedules() {
        let (queue, _) = queue().await;
        let now = Utc::now();
        queue
            .enqueue_at("u1", "q1", None, ReviewSource::Auto, now)
            .await
            .unwrap();

        let first = queue.record_review_at("u1", "q1", true, now).await.unwrap();
        assert_eq!(first.interval_hours, 60);
        let second = queue.record_review_at("u1", "q1", true, now).await.unwrap();
        assert_eq!(second.interval_hours, 150);
        let missed = queue.record_review_at("u1", "q1", false, now).await.unwrap();
        assert_eq!(missed.interval_hours, 24);
        assert_eq!(missed.ease_factor, 2.3);

        let err = queue.record_review("u1", "q2", true).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NfReview);
    }

    #[tokio::test]
    async fn test_concept_mastery_groups_untagged() {
        let (queue, _) = queue().await;
        let now = Utc::now();
        for id in ["q1", "q2", "q3"] {
            queue
                .enqueue_at("u1", id, None, ReviewSource::Manual, now)
                .await
                .unwrap();
        }
        queue.record_review_at("u1", "q1", true, now).await.unwrap();
        queue.record_review_at("u1", "q3", true, now).await.unwrap();
        queue.record_review_at("u1", "q3", true, now).await.unwrap();

        let concepts = queue.concept_mastery("u1").await.unwrap();
        assert_eq!(concepts.len(), 2);
        assert_eq!(concepts[0].concept_tag, "Elasticity");
        assert_eq!(concepts[0].item_count, 2);
        assert_eq!(concepts[0].mastery_score, 0.15);
        assert_eq!(concepts[1].concept_tag, UNTAGGED_CONCEPT);
        assert_eq!(concepts[1].mastery_score, 0.51);
        assert!(concepts[1].last_reviewed.is_some());
    }

    #[tokio::test]
    async fn test_long_correct_streak_stays_readable() {
        let (queue, store) = queue().await;
        let start = Utc::now() - Duration::hours(100);
        for id in ["q1", "q2"] {
            queue
                .enqueue_at("u1", id, None, ReviewSource::Auto, start)
                .await
                .unwrap();
        }
        for _ in 0..25 {
            queue.record_review("u1", "q1", true).await.unwrap();
        }

        let entry = store.get_review("u1", "q1").await.unwrap().unwrap();
        assert_eq!(entry.repetitions, 25);
        assert_eq!(entry.next_review_at, latest_due());

        let due = queue.due_reviews("u1", None).await.unwrap();
        assert_eq!(
            due.iter().map(|d| d.item_id.as_str()).collect::<Vec<_>>(),
            vec!["q2"]
        );

        let everything = queue
            .due_reviews_at("u1", None, entry.next_review_at)
            .await
            .unwrap();
        assert_eq!(everything.len(), 2);
        assert_eq!(everything[1].item_id, "q1");

        let concepts = queue.concept_mastery("u1").await.unwrap();
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].item_count, 2);
    }

    #[tokio::test]
    async fn test_remove_is_manual_only() {
        let (queue, store) = queue().await;
        queue
            .enqueue("u1", "q1", None, ReviewSource::Manual)
            .await
            .unwrap();
        queue.record_review("u1", "q1", false).await.unwrap();
        assert_eq!(store.list_reviews("u1").await.unwrap().len(), 1);

        assert!(queue.remove("u1", "q1").await.unwrap());
        assert!(!queue.remove("u1", "q1").await.unwrap());
    }
}
