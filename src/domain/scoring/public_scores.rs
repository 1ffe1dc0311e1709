//! Public assessment scoring on the 0..100 scale.

use serde::Serialize;
use std::collections::HashMap;

use super::MaturityLevel;
use crate::domain::catalog::LightSubset;
use crate::domain::foundation::{round_to, DomainId, QuestionId};
use crate::domain::response::{PublicAnswer, PublicResponse};

/// `100 × Σ value / (5 × n)` rounded to one decimal; 0 when nothing is answered.
///
/// `n` is the number of answers given, not the number of questions offered,
/// so the denominator grows as the visitor progresses.
pub fn percentage<I>(answers: I) -> f64
where
    I: IntoIterator<Item = PublicAnswer>,
{
    round_to(exact_percentage(answers), 1)
}

/// Unrounded percentage. Maturity buckets are read from this value so that
/// display rounding never lifts a score over a band boundary.
fn exact_percentage<I>(answers: I) -> f64
where
    I: IntoIterator<Item = PublicAnswer>,
{
    let (sum, count) = answers
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), a| (sum + a.value() as u32, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 * 100.0 / (5.0 * count as f64)
    }
}

/// Score of one domain of a public assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicDomainScore {
    pub domain_id: DomainId,
    pub name: String,
    pub score: f64,
    pub responses: usize,
    pub maturity: MaturityLevel,
}

/// Overall and per-domain scores of one public assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicScores {
    pub overall: f64,
    pub responses: usize,
    pub maturity: MaturityLevel,
    pub domains: Vec<PublicDomainScore>,
}

impl PublicScores {
    pub fn maturity(&self) -> MaturityLevel {
        self.maturity
    }
}

/// Scores a public assessment against the domains it was offered.
pub fn score_public(subset: &LightSubset, responses: &[PublicResponse]) -> PublicScores {
    let by_question: HashMap<QuestionId, PublicAnswer> = responses
        .iter()
        .map(|r| (r.question_id, r.value))
        .collect();

    let domains = subset
        .domains
        .iter()
        .map(|domain| {
            let answers: Vec<PublicAnswer> = domain
                .questions
                .iter()
                .filter_map(|q| by_question.get(&q.id).copied())
                .collect();
            let exact = exact_percentage(answers.iter().copied());
            PublicDomainScore {
                domain_id: domain.domain_id,
                name: domain.name.clone(),
                score: round_to(exact, 1),
                responses: answers.len(),
                maturity: MaturityLevel::from_percentage(exact),
            }
        })
        .collect();

    let overall = exact_percentage(by_question.values().copied());
    PublicScores {
        overall: round_to(overall, 1),
        responses: by_question.len(),
        maturity: MaturityLevel::from_percentage(overall),
        domains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::fixtures::{domain, question, tree};
    use crate::domain::foundation::{PublicAssessmentId, Timestamp};

    fn answers(values: &[i32]) -> Vec<PublicAnswer> {
        values
            .iter()
            .map(|v| PublicAnswer::from_value(*v).unwrap())
            .collect()
    }

    fn response(q: i64, value: i32) -> PublicResponse {
        PublicResponse {
            public_assessment_id: PublicAssessmentId::new(1),
            question_id: QuestionId::new(q),
            value: PublicAnswer::from_value(value).unwrap(),
            answered_at: Timestamp::now(),
        }
    }

    #[test]
    fn percentage_matches_reference_values() {
        assert_eq!(percentage(answers(&[0, 3, 5, 5])), 65.0);
        assert_eq!(percentage(answers(&[5, 5, 5, 5])), 100.0);
        assert_eq!(percentage(answers(&[0, 0, 0, 0])), 0.0);
        assert_eq!(percentage(Vec::new()), 0.0);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(answers(&[5, 3, 3])), 73.3);
    }

    #[test]
    fn domain_scores_use_only_their_questions() {
        let subset = tree(
            vec![domain(1, "A", 1), domain(2, "B", 2)],
            vec![
                question(1, 1, 1, true),
                question(2, 1, 2, true),
                question(3, 2, 1, true),
            ],
        )
        .light_subset();

        let scores = score_public(&subset, &[response(1, 5), response(2, 0), response(3, 3)]);

        assert_eq!(scores.domains[0].score, 50.0);
        assert_eq!(scores.domains[0].responses, 2);
        assert_eq!(scores.domains[1].score, 60.0);
        assert_eq!(scores.overall, 53.3);
        assert_eq!(scores.maturity(), MaturityLevel::Defined);
    }

    #[test]
    fn maturity_reads_the_unrounded_score() {
        // 98 × 5 + 3 × 3 over 500 answers is 19.96%, shown as 20.0.
        let questions: Vec<_> = (1..=500).map(|i| question(i, 1, i as i32, true)).collect();
        let subset = tree(vec![domain(1, "A", 1)], questions).light_subset();
        let responses: Vec<PublicResponse> = (1..=500)
            .map(|i| {
                let value = match i {
                    1..=98 => 5,
                    99..=101 => 3,
                    _ => 0,
                };
                response(i, value)
            })
            .collect();

        let scores = score_public(&subset, &responses);

        assert_eq!(scores.overall, 20.0);
        assert_eq!(scores.maturity(), MaturityLevel::Initial);
        assert_eq!(scores.domains[0].score, 20.0);
        assert_eq!(scores.domains[0].maturity, MaturityLevel::Initial);
    }

    #[test]
    fn unanswered_domain_scores_zero() {
        let subset = tree(
            vec![domain(1, "A", 1), domain(2, "B", 2)],
            vec![question(1, 1, 1, true), question(2, 2, 1, true)],
        )
        .light_subset();
        let scores = score_public(&subset, &[response(1, 5)]);
        assert_eq!(scores.domains[1].score, 0.0);
        assert_eq!(scores.domains[1].responses, 0);
        assert_eq!(scores.overall, 100.0);
    }
}
