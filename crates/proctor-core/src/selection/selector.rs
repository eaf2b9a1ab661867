//! Weakest-domain targeting with a cache-or-generate fallback.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SelectionConfig;
use crate::error::{ProctorError, ProctorResult};
use crate::traits::{AssessmentStore, ContentGenerator, GenerationRequest, ItemStore, LearnerStore};
use crate::types::{Domain, Item, ItemQuery, ItemView, SkillProfile};

/// Item chosen for a learner.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub view: ItemView,
    /// False when the item was generated for this request.
    pub from_cache: bool,
}

/// Picks the next practice item for a learner.
pub struct AdaptiveSelector {
    store: Arc<dyn AssessmentStore>,
    generator: Arc<dyn ContentGenerator>,
    config: SelectionConfig,
    default_rating: f64,
}

impl AdaptiveSelector {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        generator: Arc<dyn ContentGenerator>,
        config: SelectionConfig,
        default_rating: f64,
    ) -> Self {
        Self {
            store,
            generator,
            config,
            default_rating,
        }
    }

    /// Select (or generate) the next item in the learner's weakest domain.
    ///
    /// Generator failures are returned as-is; there is no retry.
    pub async fn select_next(
        &self,
        learner_id: &str,
        certification_id: &str,
    ) -> ProctorResult<Selection> {
        let certification = self
            .store
            .get_certification(certification_id)
            .await?
            .ok_or_else(|| ProctorError::certification_not_found(certification_id))?;

        let domains = self.store.list_domains(certification_id).await?;
        let profile = self.store.get_profile(learner_id).await?;

        let unattempted = self.default_rating - self.config.unattempted_handicap;
        let (domain, effective) = weakest_domain(&domains, profile.as_ref(), unattempted)
            .ok_or_else(|| ProctorError::no_domains(certification_id))?;

        let skill = profile
            .as_ref()
            .and_then(|p| p.domain_rating(&domain.id))
            .unwrap_or(self.default_rating);
        let window = self.config.difficulty_window;

        debug!(
            learner_id = %learner_id,
            domain = %domain.name,
            effective_skill = effective,
            skill,
            "Selected weakest domain"
        );

        let query = ItemQuery::domain(&domain.id, self.config.candidate_limit)
            .within(skill - window, skill + window)
            .unanswered_by(learner_id);
        let available = self.store.find_items(&query).await?;

        if let Some(best) = closest_in_window(&available, skill, window) {
            return Ok(Selection {
                view: ItemView {
                    item: best.clone(),
                    domain_name: domain.name.clone(),
                    domain_weight: domain.weight,
                },
                from_cache: true,
            });
        }

        let request = GenerationRequest::new(certification.display_name(), &domain.name, skill);
        let generated = self.generator.generate(&request).await?;
        let item = Item::from_generated(generated, &domain.id, certification_id, skill);
        self.store.insert_item(&item).await?;

        info!(
            learner_id = %learner_id,
            item_id = %item.id,
            domain = %domain.name,
            difficulty = skill,
            "Generated new item"
        );

        Ok(Selection {
            view: ItemView {
                item,
                domain_name: domain.name.clone(),
                domain_weight: domain.weight,
            },
            from_cache: false,
        })
    }
}

/// Domain with the lowest effective skill; the first one wins ties.
///
/// Domains the learner has no rating in count as `unattempted_rating`.
pub fn weakest_domain<'a>(
    domains: &'a [Domain],
    profile: Option<&SkillProfile>,
    unattempted_rating: f64,
) -> Option<(&'a Domain, f64)> {
    let mut weakest: Option<(&Domain, f64)> = None;
    for domain in domains {
        let effective = profile
            .and_then(|p| p.domain_rating(&domain.id))
            .unwrap_or(unattempted_rating);
        match weakest {
            Some((_, current)) if effective >= current => {}
            _ => weakest = Some((domain, effective)),
        }
    }
    weakest
}

/// Item within `skill ± window` closest to `skill`; the first one wins ties.
pub fn closest_in_window(items: &[Item], skill: f64, window: f64) -> Option<&Item> {
    let mut best: Option<(&Item, f64)> = None;
    for item in items {
        let distance = (item.difficulty_estimate - skill).abs();
        if distance > window {
            continue;
        }
        match best {
            Some((_, current)) if distance >= current => {}
            _ => best = Some((item, distance)),
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::traits::MockContentGenerator;
    use crate::types::{sample_content, Certification, DomainSkill, GeneratedItem};

    fn domains() -> Vec<Domain> {
        vec![
            Domain::new("d1", "c1", "Prepare", 0.3, 1),
            Domain::new("d2", "c1", "Model", 0.3, 2),
            Domain::new("d3", "c1", "Visualize", 0.4, 3),
        ]
    }

    fn profile_with(ratings: &[(&str, f64)]) -> SkillProfile {
        let mut profile = SkillProfile::new("u1");
        for (domain_id, rating) in ratings {
            let mut skill = DomainSkill::new(*domain_id);
            skill.skill_rating = *rating;
            profile.domain_skills.insert(domain_id.to_string(), skill);
        }
        profile
    }

    fn item(id: &str, difficulty: f64) -> Item {
        Item::new("d1", "c1", sample_content(id, 0))
            .with_id(id)
            .with_difficulty(difficulty)
    }

    #[test]
    fn test_unattempted_domain_beats_rated_domain() {
        let domains = vec![
            Domain::new("a", "c1", "A", 0.5, 1),
            Domain::new("b", "c1", "B", 0.5, 2),
        ];
        let profile = profile_with(&[("a", 1100.0)]);
        let (domain, effective) = weakest_domain(&domains, Some(&profile), 900.0).unwrap();
        assert_eq!(domain.id, "b");
        assert_eq!(effective, 900.0);
    }

    #[test]
    fn test_weakest_domain_ties_go_to_first() {
        let domains = domains();
        let (domain, _) = weakest_domain(&domains, None, 900.0).unwrap();
        assert_eq!(domain.id, "d1");

        let profile = profile_with(&[("d1", 950.0), ("d2", 870.0), ("d3", 870.0)]);
        let (domain, _) = weakest_domain(&domains, Some(&profile), 900.0).unwrap();
        assert_eq!(domain.id, "d2");
    }

    #[test]
    fn test_weakest_domain_empty() {
        assert!(weakest_domain(&[], None, 900.0).is_none());
    }

    #[test]
    fn test_closest_in_window() {
        let items = vec![item("far", 1049.0), item("near", 1010.0), item("tie", 990.0)];
        let best = closest_in_window(&items, 1000.0, 50.0).unwrap();
        assert_eq!(best.id, "near");

        let outside = vec![item("out", 1051.0)];
        assert!(closest_in_window(&outside, 1000.0, 50.0).is_none());
    }

    async fn seeded_store() -> Arc<SqliteStore> {
        let store = SqliteStore::in_memory().unwrap();
        store
            .insert_certification(&Certification::new("c1", "PL-300", "Power BI Data Analyst"))
            .unwrap();
        for domain in domains() {
            store.insert_domain(&domain).unwrap();
        }
        Arc::new(store)
    }

    fn selector(store: Arc<SqliteStore>, generator: MockContentGenerator) -> AdaptiveSelector {
        AdaptiveSelector::new(store, Arc::new(generator), SelectionConfig::default(), 1000.0)
    }

    #[tokio::test]
    async fn test_serves_cached_item_without_generating() {
        let store = seeded_store().await;
        store.insert_item(&item("q1", 1030.0)).await.unwrap();
        store.insert_item(&item("q2", 995.0)).await.unwrap();

        let mut generator = MockContentGenerator::new();
        generator.expect_generate().never();

        let selection = selector(store, generator).select_next("u1", "c1").await.unwrap();
        assert!(selection.from_cache);
        assert_eq!(selection.view.item.id, "q2");
        assert_eq!(selection.view.domain_name, "Prepare");
    }

    #[tokio::test]
    async fn test_generates_and_persists_when_cache_is_empty() {
        let store = seeded_store().await;
        // Out of window for the default skill.
        store.insert_item(&item("hard", 1400.0)).await.unwrap();

        let mut generator = MockContentGenerator::new();
        generator
            .expect_generate()
            .withf(|req| {
                req.domain_name == "Prepare"
                    && req.target_difficulty == 1000.0
                    && req.certification_name == "PL-300 Power BI Data Analyst"
            })
            .times(1)
            .returning(|_| {
                Ok(GeneratedItem {
                    content: sample_content("generated", 3),
                    concept_tag: "Power Query".to_string(),
                })
            });

        let selection = selector(store.clone(), generator)
            .select_next("u1", "c1")
            .await
            .unwrap();
        assert!(!selection.from_cache);
        assert_eq!(selection.view.item.difficulty_estimate, 1000.0);

        let stored = store.get_item(&selection.view.item.id).await.unwrap().unwrap();
        assert_eq!(stored.concept_tag.as_deref(), Some("Power Query"));
        assert_eq!(stored.domain_id, "d1");
    }

    #[tokio::test]
    async fn test_answered_items_are_skipped() {
        let store = seeded_store().await;
        store.insert_item(&item("seen", 1000.0)).await.unwrap();
        // A bare response row: the learner has seen the item but has no profile yet.
        store
            .execute_batch(
                "INSERT INTO responses (learner_id, item_id, selected_index, is_correct,
                                        skill_before, skill_after, answered_at)
                 VALUES ('u1', 'seen', 0, 1, 1000, 1016, '2026-03-01T12:00:00.000000Z');",
            )
            .unwrap();

        let mut generator = MockContentGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Err(ProctorError::timeout("generator timed out")));

        let err = selector(store, generator).select_next("u1", "c1").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_schema_violation_surfaces_as_validation() {
        let store = seeded_store().await;
        let mut generator = MockContentGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Err(ProctorError::generated_schema("expected 4 options, got 3")));

        let err = selector(store.clone(), generator)
            .select_next("u1", "c1")
            .await
            .unwrap_err();
        assert!(matches!(err, ProctorError::Validation { .. }));
        assert!(store
            .find_items(&ItemQuery::domain("d1", 0))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_certification_without_domains() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .insert_certification(&Certification::new("empty", "X-1", "Empty"))
            .unwrap();
        let err = selector(store, MockContentGenerator::new())
            .select_next("u1", "empty")
            .await
            .unwrap_err();
        assert!(matches!(err, ProctorError::NotFound { .. }));
    }
}
