//! Weighted session scoring.

use crate::types::{percent, DomainResult, ItemView, QuestionResult};

/// One scored position of a session.
#[derive(Debug, Clone, Copy)]
pub struct AnsweredPosition<'a> {
    pub index: usize,
    pub view: &'a ItemView,
    /// -1 when the position was left unanswered.
    pub selected_index: i32,
}

/// Tallies of a scored session.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub domain_results: Vec<DomainResult>,
    pub question_results: Vec<QuestionResult>,
}

impl ScoreCard {
    /// Overall accuracy in percent, one decimal.
    pub fn accuracy(&self) -> f64 {
        percent(self.correct_answers, self.total_questions)
    }
}

/// Score a session on a `0..=max_score` scale.
///
/// Domains appear in the order their first item appears.
pub fn score_positions(positions: &[AnsweredPosition<'_>], max_score: u32) -> ScoreCard {
    let mut domain_results: Vec<DomainResult> = Vec::new();
    let mut question_results = Vec::with_capacity(positions.len());
    let mut correct_answers = 0;

    for position in positions {
        let item = &position.view.item;
        let is_correct = item.is_correct(position.selected_index);
        if is_correct {
            correct_answers += 1;
        }

        let idx = match domain_results
            .iter()
            .position(|d| d.domain_name == position.view.domain_name)
        {
            Some(idx) => idx,
            None => {
                domain_results.push(DomainResult {
                    domain_name: position.view.domain_name.clone(),
                    weight: position.view.domain_weight,
                    questions_total: 0,
                    questions_correct: 0,
                    accuracy: 0.0,
                });
                domain_results.len() - 1
            }
        };
        let domain = &mut domain_results[idx];
        domain.questions_total += 1;
        if is_correct {
            domain.questions_correct += 1;
        }

        question_results.push(QuestionResult {
            index: position.index,
            item_id: item.id.clone(),
            scenario: item.content.scenario.clone(),
            question: item.content.question.clone(),
            options: item.content.options.clone(),
            correct_index: item.content.correct_index,
            selected_index: position.selected_index,
            is_correct,
            explanation: item.content.explanation.clone(),
            domain: position.view.domain_name.clone(),
            concept_tag: item.concept_tag.clone().unwrap_or_default(),
        });
    }

    for domain in &mut domain_results {
        domain.accuracy = percent(domain.questions_correct, domain.questions_total);
    }

    ScoreCard {
        score: weighted_score(&domain_results, max_score),
        total_questions: positions.len() as u32,
        correct_answers,
        domain_results,
        question_results,
    }
}

/// `round(Σ (w / Σw) · (correct / total) · max_score)`.
pub fn weighted_score(domains: &[DomainResult], max_score: u32) -> u32 {
    let total_weight: f64 = domains.iter().map(|d| d.weight).sum();
    if total_weight <= 0.0 {
        return 0;
    }
    let score: f64 = domains
        .iter()
        .filter(|d| d.questions_total > 0)
        .map(|d| {
            let accuracy = f64::from(d.questions_correct) / f64::from(d.questions_total);
            (d.weight / total_weight) * accuracy * f64::from(max_score)
        })
        .sum();
    score.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{sample_content, Item};

    fn view(id: &str, domain: &str, weight: f64) -> ItemView {
        ItemView {
            item: Item::new(domain, "c1", sample_content(id, 1)).with_id(id),
            domain_name: domain.to_string(),
            domain_weight: weight,
        }
    }

    fn domain(name: &str, weight: f64, total: u32, correct: u32) -> DomainResult {
        DomainResult {
            domain_name: name.to_string(),
            weight,
            questions_total: total,
            questions_correct: correct,
            accuracy: 0.0,
        }
    }

    #[test]
    fn test_equal_weights_equal_accuracy() {
        for (correct, expected) in [(0, 0), (3, 300), (7, 700), (10, 1000)] {
            let domains = vec![
                domain("A", 0.25, 10, correct),
                domain("B", 0.25, 10, correct),
                domain("C", 0.25, 10, correct),
                domain("D", 0.25, 10, correct),
            ];
            assert_eq!(weighted_score(&domains, 1000), expected);
        }
    }

    #[test]
    fn test_weights_are_normalized() {
        let domains = vec![domain("A", 0.6, 10, 10), domain("B", 0.2, 10, 0)];
        assert_eq!(weighted_score(&domains, 1000), 750);
    }

    #[test]
    fn test_unanswered_counts_as_incorrect() {
        let views = [view("q1", "Model", 0.5), view("q2", "Model", 0.5)];
        let positions = [
            AnsweredPosition {
                index: 0,
                view: &views[0],
                selected_index: 1,
            },
            AnsweredPosition {
                index: 1,
                view: &views[1],
                selected_index: -1,
            },
        ];

        let card = score_positions(&positions, 1000);
        assert_eq!(card.correct_answers, 1);
        assert_eq!(card.score, 500);
        assert_eq!(card.accuracy(), 50.0);
        assert!(!card.question_results[1].is_correct);
        assert_eq!(card.question_results[1].selected_index, -1);
        assert_eq!(card.domain_results.len(), 1);
        assert_eq!(card.domain_results[0].accuracy, 50.0);
    }

    #[test]
    fn test_domain_order_follows_first_appearance() {
        let views = [
            view("q1", "Visualize", 0.4),
            view("q2", "Prepare", 0.6),
            view("q3", "Visualize", 0.4),
        ];
        let positions: Vec<_> = views
            .iter()
            .enumerate()
            .map(|(index, view)| AnsweredPosition {
                index,
                view,
                selected_index: 1,
            })
            .collect();

        let card = score_positions(&positions, 1000);
        let names: Vec<_> = card.domain_results.iter().map(|d| d.domain_name.as_str()).collect();
        assert_eq!(names, vec!["Visualize", "Prepare"]);
        assert_eq!(card.score, 1000);
    }
}
