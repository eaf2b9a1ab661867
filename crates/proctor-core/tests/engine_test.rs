//! Integration tests for practice answering, selection, and reviews.

mod common;

use chrono::{Duration, Utc};
use common::{seeded_store, ScriptedGenerator, CERT_ID};
use proctor_core::traits::{ItemStore, LearnerStore};
use proctor_core::types::Confidence;
use proctor_core::{AnswerSubmission, AssessmentEngine, EngineConfig, ErrorCode};
use std::sync::Arc;
use tokio_test::assert_err;

fn answer(item_id: &str, selected_index: i32) -> AnswerSubmission {
    AnswerSubmission {
        item_id: item_id.to_string(),
        selected_index,
        time_spent_seconds: Some(30),
    }
}

/// Empty bank: the first question is generated, cold-started at the learner's skill.
#[tokio::test]
async fn test_first_question_is_generated_and_persisted() {
    let store = seeded_store(0).await;
    let generator = Arc::new(ScriptedGenerator::default());
    let engine = AssessmentEngine::new(
        EngineConfig::default(),
        Arc::new(store.clone()),
        generator.clone(),
    );

    let next = engine.next_question("u1", CERT_ID).await.unwrap();
    assert!(!next.from_cache);
    assert_eq!(next.item.domain, "Prepare the Data");
    assert_eq!(next.item.options.len(), 4);
    assert_eq!(generator.calls(), 1);
    assert_eq!(generator.requests()[0].target_difficulty, 1000.0);

    let stored = store.get_item(&next.item.item_id).await.unwrap().unwrap();
    assert_eq!(stored.difficulty_estimate, 1000.0);
    assert_eq!(stored.concept_tag.as_deref(), Some("Prepare the Data generated"));
}

/// Unattempted domains are visited before any attempted one.
#[tokio::test]
async fn test_selection_walks_unattempted_domains_first() {
    let store = seeded_store(3).await;
    let engine = AssessmentEngine::new(
        EngineConfig::default(),
        Arc::new(store),
        Arc::new(ScriptedGenerator::default()),
    );

    let mut visited = Vec::new();
    for _ in 0..4 {
        let next = engine.next_question("u1", CERT_ID).await.unwrap();
        assert!(next.from_cache);
        visited.push(next.item.domain.clone());
        // A missed domain drops to 984, still above the 900 of unattempted ones.
        engine
            .submit_answer("u1", &answer(&next.item.item_id, 1))
            .await
            .unwrap();
    }

    assert_eq!(
        visited,
        vec![
            "Prepare the Data",
            "Model the Data",
            "Visualize and Analyze the Data",
            "Manage and Secure Power BI",
        ]
    );
}

#[tokio::test]
async fn test_pass_probability_activates_after_twenty_answers() {
    let store = seeded_store(10).await;
    let engine = AssessmentEngine::new(
        EngineConfig::default(),
        Arc::new(store.clone()),
        Arc::new(ScriptedGenerator::default()),
    );

    for n in 0..25 {
        let next = engine.next_question("u1", CERT_ID).await.unwrap();
        engine
            .submit_answer("u1", &answer(&next.item.item_id, 0))
            .await
            .unwrap();

        let estimate = engine.pass_probability("u1", CERT_ID).await.unwrap();
        if n < 19 {
            assert!(!estimate.is_active);
            assert_eq!(estimate.questions_remaining, 19 - n);
            assert_eq!(estimate.estimate, 0.0);
        }
    }

    let estimate = engine.pass_probability("u1", CERT_ID).await.unwrap();
    assert!(estimate.is_active);
    assert_eq!(estimate.confidence, Confidence::Low);
    assert_eq!(estimate.questions_remaining, 0);
    assert!(estimate.estimate > 75.0 && estimate.estimate <= 99.0);
    assert_eq!(estimate.domain_contributions.len(), 4);

    let report = engine.progress("u1", CERT_ID).await.unwrap();
    assert_eq!(report.total_questions, 25);
    assert_eq!(report.accuracy, 100.0);
    assert!(report.global_skill > 1000.0);
    assert_eq!(report.pass_probability, estimate);

    let outcomes = store.recent_outcomes("u1", CERT_ID, 25).await.unwrap();
    assert_eq!(outcomes.len(), 25);
}

#[tokio::test]
async fn test_missed_item_goes_through_review_cycle() {
    let store = seeded_store(2).await;
    let engine = AssessmentEngine::new(
        EngineConfig::default(),
        Arc::new(store),
        Arc::new(ScriptedGenerator::default()),
    );

    engine
        .submit_answer("u1", &answer("prepare-0", 3))
        .await
        .unwrap();

    let reviews = engine.reviews();
    assert!(reviews.due_reviews("u1", None).await.unwrap().is_empty());

    let later = Utc::now() + Duration::hours(25);
    let due = reviews.due_reviews_at("u1", None, later).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].item_id, "prepare-0");
    assert_eq!(due[0].domain, "Prepare the Data");
    assert_eq!(due[0].concept_tag, "Prepare the Data concept");

    let entry = reviews
        .record_review_at("u1", "prepare-0", true, later)
        .await
        .unwrap();
    assert_eq!(entry.interval_hours, 60);
    assert_eq!(entry.ease_factor, 2.5);
    assert_eq!(entry.repetitions, 1);
    assert_eq!(entry.mastery_score, 0.3);

    let mastery = reviews.concept_mastery("u1").await.unwrap();
    assert_eq!(mastery.len(), 1);
    assert_eq!(mastery[0].mastery_score, 0.3);

    // A second miss of the same item does not create a second entry.
    let outcome = engine
        .submit_answer("u1", &answer("prepare-0", 2))
        .await
        .unwrap();
    assert!(!outcome.is_correct);
    assert_eq!(reviews.concept_mastery("u1").await.unwrap()[0].item_count, 1);

    assert!(reviews.remove("u1", "prepare-0").await.unwrap());
    assert!(!reviews.remove("u1", "prepare-0").await.unwrap());

    let err = assert_err!(reviews.record_review("u1", "prepare-0", true).await);
    assert_eq!(err.code(), ErrorCode::NfReview);
}

#[tokio::test]
async fn test_unknown_certification() {
    let store = seeded_store(1).await;
    let engine = AssessmentEngine::new(
        EngineConfig::default(),
        Arc::new(store),
        Arc::new(ScriptedGenerator::default()),
    );

    let err = assert_err!(engine.next_question("u1", "az-900").await);
    assert_eq!(err.code(), ErrorCode::NfCertification);
    assert!(!err.is_retryable());
}
