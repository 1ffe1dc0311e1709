//! Read models produced once a public assessment is scored: the visitor's
//! result summary and the per-domain answer digest sent with lead alerts.

use serde::Serialize;
use std::collections::HashMap;

use super::PublicAssessment;
use crate::domain::catalog::LightSubset;
use crate::domain::foundation::{DomainId, QuestionId, Timestamp};
use crate::domain::response::{PublicAnswer, PublicResponse};
use crate::domain::scoring::{MaturityLevel, PublicScores};

/// One domain of the result page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultDomain {
    pub domain_id: DomainId,
    pub name: String,
    pub score: f64,
    pub maturity: MaturityLevel,
    pub recommendation: String,
}

/// Everything the result page and the result email render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub token: String,
    pub type_name: String,
    pub overall: f64,
    pub maturity: MaturityLevel,
    pub responses: usize,
    pub domains: Vec<ResultDomain>,
    pub cta_text: Option<String>,
    pub completed_at: Option<Timestamp>,
}

impl ResultSummary {
    /// `recommendations` is aligned with `scores.domains`; missing entries
    /// render as empty text.
    pub fn assemble(
        assessment: &PublicAssessment,
        type_name: &str,
        cta_text: Option<&str>,
        scores: &PublicScores,
        recommendations: Vec<String>,
    ) -> Self {
        let mut recommendations = recommendations.into_iter();
        let domains = scores
            .domains
            .iter()
            .map(|d| ResultDomain {
                domain_id: d.domain_id,
                name: d.name.clone(),
                score: d.score,
                maturity: d.maturity,
                recommendation: recommendations.next().unwrap_or_default(),
            })
            .collect();
        Self {
            token: assessment.token().to_string(),
            type_name: type_name.to_string(),
            overall: scores.overall,
            maturity: scores.maturity(),
            responses: scores.responses,
            domains,
            cta_text: cta_text.map(str::to_string),
            completed_at: assessment.completed_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigestLine {
    pub question: String,
    pub answer: PublicAnswer,
}

/// Answers of one domain, in question order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerDigest {
    pub domain: String,
    pub lines: Vec<DigestLine>,
}

/// Groups the given answers by the domain they belong to. Domains without
/// any answer are left out.
pub fn answer_digest(subset: &LightSubset, responses: &[PublicResponse]) -> Vec<AnswerDigest> {
    let by_question: HashMap<QuestionId, PublicAnswer> = responses
        .iter()
        .map(|r| (r.question_id, r.value))
        .collect();
    subset
        .domains
        .iter()
        .filter_map(|domain| {
            let lines: Vec<DigestLine> = domain
                .questions
                .iter()
                .filter_map(|q| {
                    by_question.get(&q.id).map(|answer| DigestLine {
                        question: q.text.clone(),
                        answer: *answer,
                    })
                })
                .collect();
            (!lines.is_empty()).then(|| AnswerDigest {
                domain: domain.name.clone(),
                lines,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::fixtures::{domain, question, tree};
    use crate::domain::foundation::PublicAssessmentId;

    fn response(q: i64, value: i32) -> PublicResponse {
        PublicResponse {
            public_assessment_id: PublicAssessmentId::new(1),
            question_id: QuestionId::new(q),
            value: PublicAnswer::from_value(value).unwrap(),
            answered_at: Timestamp::now(),
        }
    }

    #[test]
    fn digest_groups_answers_by_domain_and_skips_empty_domains() {
        let subset = tree(
            vec![domain(1, "Identity", 1), domain(2, "Network", 2)],
            vec![
                question(10, 1, 1, true),
                question(11, 1, 2, true),
                question(20, 2, 1, true),
            ],
        )
        .light_subset();

        let digest = answer_digest(&subset, &[response(11, 3), response(10, 5)]);

        assert_eq!(digest.len(), 1);
        assert_eq!(digest[0].domain, "Identity");
        assert_eq!(digest[0].lines.len(), 2);
        assert_eq!(digest[0].lines[0].answer, PublicAnswer::Yes);
        assert_eq!(digest[0].lines[1].answer, PublicAnswer::Partial);
    }
}
