//! Read model of a full version: ordered domains with their questions.

use serde::Serialize;

use super::{AssessmentVersion, Domain, DomainFields, Question, QuestionFields};
use crate::domain::foundation::{DomainId, QuestionId};

/// A domain together with its ordered questions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainNode {
    pub domain: Domain,
    pub questions: Vec<Question>,
}

impl DomainNode {
    /// Active questions in display order.
    pub fn active_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.active)
    }
}

/// A version with its whole domain/question tree, sorted by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionTree {
    pub version: AssessmentVersion,
    pub domains: Vec<DomainNode>,
}

/// Counts shown next to a version in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionTotals {
    pub domains: usize,
    pub questions: usize,
    pub light_questions: usize,
}

/// The abridged public questionnaire of a version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightSubset {
    pub domains: Vec<LightDomain>,
}

/// One step of the public questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightDomain {
    pub domain_id: DomainId,
    pub name: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
}

impl LightSubset {
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn domain(&self, id: DomainId) -> Option<&LightDomain> {
        self.domains.iter().find(|d| d.domain_id == id)
    }
}

/// Structure to copy into a new draft. Positions and text are preserved;
/// identities are assigned by the store on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionBlueprint {
    pub domains: Vec<DomainBlueprint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainBlueprint {
    pub fields: DomainFields,
    pub position: i32,
    pub questions: Vec<(QuestionFields, i32)>,
}

impl VersionBlueprint {
    /// Blueprint of an empty version.
    pub fn empty() -> Self {
        Self { domains: vec![] }
    }
}

impl VersionTree {
    /// Builds a tree from flat rows, sorting by position then id.
    pub fn assemble(
        version: AssessmentVersion,
        mut domains: Vec<Domain>,
        mut questions: Vec<Question>,
    ) -> Self {
        domains.sort_by_key(|d| (d.position, d.id));
        questions.sort_by_key(|q| (q.position, q.id));
        let nodes = domains
            .into_iter()
            .map(|domain| {
                let questions = questions
                    .iter()
                    .filter(|q| q.domain_id == domain.id)
                    .cloned()
                    .collect();
                DomainNode { domain, questions }
            })
            .collect();
        Self {
            version,
            domains: nodes,
        }
    }

    /// Active domains in display order.
    pub fn active_domains(&self) -> impl Iterator<Item = &DomainNode> {
        self.domains.iter().filter(|d| d.domain.active)
    }

    /// Active questions of active domains, in display order.
    pub fn active_questions(&self) -> impl Iterator<Item = &Question> {
        self.active_domains().flat_map(|d| d.active_questions())
    }

    pub fn total_active_questions(&self) -> usize {
        self.active_questions().count()
    }

    /// True if the question is active and reachable from this version.
    pub fn contains_active_question(&self, id: QuestionId) -> bool {
        self.active_questions().any(|q| q.id == id)
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.domains
            .iter()
            .flat_map(|d| d.questions.iter())
            .find(|q| q.id == id)
    }

    pub fn domain(&self, id: DomainId) -> Option<&DomainNode> {
        self.domains.iter().find(|d| d.domain.id == id)
    }

    pub fn totals(&self) -> VersionTotals {
        VersionTotals {
            domains: self.active_domains().count(),
            questions: self.total_active_questions(),
            light_questions: self.active_questions().filter(|q| q.light).count(),
        }
    }

    /// Questions flagged light, grouped by their domain. Domains without
    /// any active light question are left out.
    pub fn light_subset(&self) -> LightSubset {
        let domains = self
            .active_domains()
            .filter_map(|node| {
                let questions: Vec<Question> =
                    node.active_questions().filter(|q| q.light).cloned().collect();
                if questions.is_empty() {
                    None
                } else {
                    Some(LightDomain {
                        domain_id: node.domain.id,
                        name: node.domain.name.clone(),
                        description: node.domain.description.clone(),
                        questions,
                    })
                }
            })
            .collect();
        LightSubset { domains }
    }

    /// Deep copy of every active domain and question.
    pub fn blueprint(&self) -> VersionBlueprint {
        let domains = self
            .active_domains()
            .map(|node| DomainBlueprint {
                fields: DomainFields::from(&node.domain),
                position: node.domain.position,
                questions: node
                    .active_questions()
                    .map(|q| (QuestionFields::from(q), q.position))
                    .collect(),
            })
            .collect();
        VersionBlueprint { domains }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn assemble_sorts_by_position() {
        let tree = tree(
            vec![domain(2, "Second", 2), domain(1, "First", 1)],
            vec![question(11, 1, 2, false), question(10, 1, 1, true)],
        );
        assert_eq!(tree.domains[0].domain.name, "First");
        assert_eq!(tree.domains[0].questions[0].id, QuestionId::new(10));
        assert!(tree.domains[1].questions.is_empty());
    }

    #[test]
    fn light_subset_keeps_only_light_questions() {
        let tree = tree(
            vec![domain(1, "D", 1)],
            vec![question(1, 1, 1, true), question(2, 1, 2, false)],
        );
        let subset = tree.light_subset();
        assert_eq!(subset.domains.len(), 1);
        assert_eq!(subset.domains[0].name, "D");
        assert_eq!(subset.domains[0].questions.len(), 1);
        assert_eq!(subset.domains[0].questions[0].id, QuestionId::new(1));
    }

    #[test]
    fn light_subset_skips_domains_without_light_questions() {
        let tree = tree(
            vec![domain(1, "A", 1), domain(2, "B", 2)],
            vec![question(1, 1, 1, false), question(2, 2, 1, true)],
        );
        let subset = tree.light_subset();
        assert_eq!(subset.domains.len(), 1);
        assert_eq!(subset.domains[0].domain_id, DomainId::new(2));
    }

    #[test]
    fn inactive_rows_are_excluded_from_totals_and_blueprint() {
        let mut inactive_domain = domain(2, "Old", 2);
        inactive_domain.active = false;
        let mut inactive_question = question(3, 1, 3, true);
        inactive_question.active = false;
        let tree = tree(
            vec![domain(1, "A", 1), inactive_domain],
            vec![
                question(1, 1, 1, true),
                question(2, 1, 2, false),
                inactive_question,
                question(4, 2, 1, true),
            ],
        );

        let totals = tree.totals();
        assert_eq!(totals.domains, 1);
        assert_eq!(totals.questions, 2);
        assert_eq!(totals.light_questions, 1);

        let blueprint = tree.blueprint();
        assert_eq!(blueprint.domains.len(), 1);
        assert_eq!(blueprint.domains[0].questions.len(), 2);
        assert_eq!(blueprint.domains[0].questions[1].1, 2);
        assert!(!tree.contains_active_question(QuestionId::new(3)));
        assert!(!tree.contains_active_question(QuestionId::new(4)));
    }
}
