//! In-memory adapters.
//!
//! [`InMemoryStore`] implements every repository port over one
//! mutex-guarded state. Each port call takes the lock once, so multi-row
//! writes (publish, finalize, lead materialization) are as atomic as the
//! PostgreSQL transactions they stand in for.
//!
//! Used by the test suite and by local runs without a database.

mod catalog;
mod clients;
mod intake;
mod leads;
mod projects;
mod public;
mod responses;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::catalog::{AssessmentType, AssessmentVersion, Domain, Question, VersionTree};
use crate::domain::client::{Client, Respondent};
use crate::domain::foundation::{
    ClientId, DomainId, LeadId, ProjectAssessmentId, ProjectId, PublicAssessmentId, QuestionId,
    RespondentId, TypeId, VersionId,
};
use crate::domain::lead::{Lead, LeadHistoryEntry};
use crate::domain::project::{Membership, Progress, Project, ProjectAssessment};
use crate::domain::public::{IntakeSession, PublicAssessment, SessionHandle};
use crate::domain::response::{ProjectResponse, PublicResponse};

/// Shared in-memory backing store. Cloning shares the state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lead history rows across all leads (for test assertions).
    pub async fn history_row_count(&self) -> usize {
        self.state.lock().await.lead_history.len()
    }

    /// Number of public response rows across all assessments.
    pub async fn public_response_row_count(&self) -> usize {
        self.state.lock().await.public_responses.len()
    }
}

#[derive(Default)]
struct State {
    sequence: i64,
    types: BTreeMap<TypeId, AssessmentType>,
    versions: BTreeMap<VersionId, AssessmentVersion>,
    domains: BTreeMap<DomainId, Domain>,
    questions: BTreeMap<QuestionId, Question>,
    clients: BTreeMap<ClientId, Client>,
    respondents: BTreeMap<RespondentId, Respondent>,
    projects: BTreeMap<ProjectId, Project>,
    bindings: BTreeMap<ProjectAssessmentId, ProjectAssessment>,
    memberships: Vec<Membership>,
    project_responses: BTreeMap<(ProjectId, QuestionId), ProjectResponse>,
    public_assessments: BTreeMap<PublicAssessmentId, PublicAssessment>,
    public_responses: BTreeMap<(PublicAssessmentId, QuestionId), PublicResponse>,
    leads: BTreeMap<LeadId, Lead>,
    lead_history: Vec<(LeadId, LeadHistoryEntry)>,
    intake_sessions: HashMap<SessionHandle, IntakeSession>,
}

impl State {
    /// One sequence for every table, like a shared database sequence.
    fn next_id(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }

    fn tree(&self, version_id: VersionId) -> Option<VersionTree> {
        let version = self.versions.get(&version_id)?.clone();
        let domains: Vec<Domain> = self
            .domains
            .values()
            .filter(|d| d.version_id == version_id)
            .cloned()
            .collect();
        let questions = self
            .questions
            .values()
            .filter(|q| domains.iter().any(|d| d.id == q.domain_id))
            .cloned()
            .collect();
        Some(VersionTree::assemble(version, domains, questions))
    }

    /// Progress of a binding, optionally counting one author's answers only.
    fn progress(&self, binding: &ProjectAssessment, author: Option<RespondentId>) -> Progress {
        let Some(tree) = self.tree(binding.version_id()) else {
            return Progress::new(0, 0);
        };
        let project = binding.project_id();
        let total = tree.total_active_questions();
        let answered = tree
            .active_questions()
            .filter(|q| {
                self.project_responses
                    .get(&(project, q.id))
                    .is_some_and(|r| author.map_or(true, |a| r.respondent_id == a))
            })
            .count();
        Progress::new(answered, total)
    }

    fn project_bindings(&self, project_id: ProjectId) -> Vec<ProjectAssessment> {
        self.bindings
            .values()
            .filter(|b| b.project_id() == project_id)
            .cloned()
            .collect()
    }
}
