//! Project scoring on the 0..5 scale.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::catalog::VersionTree;
use crate::domain::foundation::{DomainId, QuestionId, VersionId};
use crate::domain::response::ProjectResponse;

/// Mean score of one domain inside a binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainScore {
    pub domain_id: DomainId,
    pub name: String,
    /// Mean of answered questions; `None` when nothing is answered.
    pub mean: Option<f64>,
    pub answered: usize,
    pub total: usize,
}

impl DomainScore {
    /// Share of the domain's questions that have an answer, 0..=100.
    pub fn completeness(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.answered as f64 * 100.0 / self.total as f64
        }
    }
}

/// Scores of one project binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingScore {
    pub version_id: VersionId,
    /// Mean of every answered question across all domains.
    pub overall: Option<f64>,
    pub answered: usize,
    pub total: usize,
    pub domains: Vec<DomainScore>,
}

fn mean(values: &[u8]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64)
    }
}

/// Scores a binding from the project's stored answers.
///
/// Only active questions of active domains count; answers to anything else
/// (e.g. questions of another bound version) are ignored.
pub fn score_binding(tree: &VersionTree, responses: &[ProjectResponse]) -> BindingScore {
    let by_question: HashMap<QuestionId, u8> = responses
        .iter()
        .map(|r| (r.question_id, r.score.value()))
        .collect();

    let mut all = Vec::new();
    let mut total = 0;
    let domains = tree
        .active_domains()
        .map(|node| {
            let questions: Vec<_> = node.active_questions().collect();
            let values: Vec<u8> = questions
                .iter()
                .filter_map(|q| by_question.get(&q.id).copied())
                .collect();
            all.extend_from_slice(&values);
            total += questions.len();
            DomainScore {
                domain_id: node.domain.id,
                name: node.domain.name.clone(),
                mean: mean(&values),
                answered: values.len(),
                total: questions.len(),
            }
        })
        .collect();

    BindingScore {
        version_id: tree.version.id(),
        overall: mean(&all),
        answered: all.len(),
        total,
        domains,
    }
}

/// Equal-weight mean of binding overalls. Bindings with no answers are left out.
pub fn project_overall(bindings: &[BindingScore]) -> Option<f64> {
    let overalls: Vec<f64> = bindings.iter().filter_map(|b| b.overall).collect();
    if overalls.is_empty() {
        None
    } else {
        Some(overalls.iter().sum::<f64>() / overalls.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::fixtures::{domain, question, tree};
    use crate::domain::foundation::{ProjectId, RespondentId, Timestamp};
    use crate::domain::response::ProjectScore;

    fn answer(q: i64, score: i32) -> ProjectResponse {
        ProjectResponse {
            project_id: ProjectId::new(1),
            question_id: QuestionId::new(q),
            respondent_id: RespondentId::new(1),
            score: ProjectScore::new(score).unwrap(),
            comment: None,
            answered_at: Timestamp::now(),
        }
    }

    fn two_domain_tree() -> VersionTree {
        tree(
            vec![domain(1, "Identity", 1), domain(2, "Network", 2)],
            vec![
                question(1, 1, 1, true),
                question(2, 1, 2, false),
                question(3, 2, 1, true),
                question(4, 2, 2, false),
            ],
        )
    }

    #[test]
    fn unanswered_questions_are_excluded_from_means() {
        let score = score_binding(&two_domain_tree(), &[answer(1, 4), answer(3, 1), answer(4, 3)]);

        assert_eq!(score.domains[0].mean, Some(4.0));
        assert_eq!(score.domains[0].answered, 1);
        assert_eq!(score.domains[0].completeness(), 50.0);
        assert_eq!(score.domains[1].mean, Some(2.0));
        assert_eq!(score.overall, Some(8.0 / 3.0));
        assert_eq!(score.answered, 3);
        assert_eq!(score.total, 4);
    }

    #[test]
    fn domain_without_answers_has_no_mean() {
        let score = score_binding(&two_domain_tree(), &[answer(1, 5)]);
        assert_eq!(score.domains[1].mean, None);
        assert_eq!(score.overall, Some(5.0));
    }

    #[test]
    fn foreign_answers_are_ignored() {
        let score = score_binding(&two_domain_tree(), &[answer(99, 0)]);
        assert_eq!(score.overall, None);
        assert_eq!(score.answered, 0);
    }

    #[test]
    fn project_overall_weights_bindings_equally() {
        let t = two_domain_tree();
        let a = score_binding(&t, &[answer(1, 5)]);
        let b = score_binding(&t, &[answer(1, 1), answer(2, 1), answer(3, 1), answer(4, 1)]);
        let empty = score_binding(&t, &[]);
        assert_eq!(project_overall(&[a, b, empty]), Some(3.0));
        assert_eq!(project_overall(&[]), None);
    }
}
