//! Shared fixtures for handler tests.

use std::sync::Arc;

use crate::adapters::audit::InMemoryAuditLog;
use crate::adapters::memory::InMemoryStore;
use crate::adapters::notify::InMemoryNotifier;
use crate::domain::catalog::{
    AssessmentType, DomainBlueprint, DomainFields, PublicIntakeSettings, QuestionFields, TypeDraft,
    VersionBlueprint, VersionDraft, VersionTree,
};
use crate::domain::client::{Client, ClientDraft, Respondent, RespondentDraft};
use crate::domain::foundation::{Principal, Timestamp, VersionId};
use crate::domain::lead::{Lead, LeadDraft};
use crate::domain::project::{Project, ProjectAssessment, ProjectDraft};
use crate::domain::public::{ContactDetails, ContactInput, PublicAssessmentDraft, ResultToken};
use crate::domain::response::{PublicAnswer, PublicResponse};
use crate::domain::scoring::score_public;
use crate::ports::{
    AuditLog, CatalogRepository, ClientRepository, IntakeSessionStore, LeadRepository, Notifier,
    ProjectRepository, PublicAssessmentRepository, ResponseRepository,
};

pub(crate) struct ProjectSetup {
    pub project: Project,
    pub bindings: Vec<ProjectAssessment>,
    pub respondents: Vec<Respondent>,
}

pub(crate) struct Fixture {
    pub store: InMemoryStore,
    pub audit: InMemoryAuditLog,
    pub notifier: InMemoryNotifier,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
            audit: InMemoryAuditLog::new(),
            notifier: InMemoryNotifier::new(),
        }
    }

    pub fn catalog(&self) -> Arc<dyn CatalogRepository> {
        Arc::new(self.store.clone())
    }

    pub fn clients(&self) -> Arc<dyn ClientRepository> {
        Arc::new(self.store.clone())
    }

    pub fn projects(&self) -> Arc<dyn ProjectRepository> {
        Arc::new(self.store.clone())
    }

    pub fn responses(&self) -> Arc<dyn ResponseRepository> {
        Arc::new(self.store.clone())
    }

    pub fn public(&self) -> Arc<dyn PublicAssessmentRepository> {
        Arc::new(self.store.clone())
    }

    pub fn leads(&self) -> Arc<dyn LeadRepository> {
        Arc::new(self.store.clone())
    }

    pub fn sessions(&self) -> Arc<dyn IntakeSessionStore> {
        Arc::new(self.store.clone())
    }

    pub fn audit_log(&self) -> Arc<dyn AuditLog> {
        Arc::new(self.audit.clone())
    }

    pub fn notifier_port(&self) -> Arc<dyn Notifier> {
        Arc::new(self.notifier.clone())
    }

    /// Creates a type whose draft "1.0" holds the given domains, each a
    /// list of light flags, one per question, and publishes it.
    pub async fn published_type(
        &self,
        name: &str,
        domains: &[(&str, &[bool])],
    ) -> (AssessmentType, VersionTree) {
        let catalog = self.catalog();
        let blueprint = blueprint(domains);
        let (assessment_type, version) = catalog
            .create_type(
                &TypeDraft::new(name, None).unwrap(),
                &VersionDraft::initial(Some("admin".into())),
                &blueprint,
                Timestamp::now(),
            )
            .await
            .unwrap();
        catalog
            .publish_version(version.id(), Timestamp::now())
            .await
            .unwrap();
        let tree = catalog.load_tree(version.id()).await.unwrap().unwrap();
        (assessment_type, tree)
    }

    /// Like [`Fixture::published_type`] with public intake switched on.
    pub async fn public_type(
        &self,
        name: &str,
        domains: &[(&str, &[bool])],
        recipients: &str,
    ) -> (AssessmentType, VersionTree) {
        let (mut assessment_type, tree) = self.published_type(name, domains).await;
        assessment_type.apply_intake_settings(
            PublicIntakeSettings::parse(true, recipients, Some("Book a call".into())).unwrap(),
        );
        self.catalog().update_type(&assessment_type).await.unwrap();
        (assessment_type, tree)
    }

    pub async fn client_with(&self, logins: &[&str]) -> (Client, Vec<Respondent>) {
        let clients = self.clients();
        let client = clients
            .create_client(
                &ClientDraft::new("Acme", None, None, None, None).unwrap(),
                Timestamp::now(),
            )
            .await
            .unwrap();
        let mut respondents = Vec::new();
        for login in logins {
            let draft = RespondentDraft::new(
                client.id,
                login,
                "digest".into(),
                login.split('@').next().unwrap_or("someone"),
                None,
                None,
            )
            .unwrap();
            respondents.push(clients.create_respondent(&draft, Timestamp::now()).await.unwrap());
        }
        (client, respondents)
    }
}

impl Fixture {
    /// A project over `versions` whose client has one respondent per login,
    /// each added as an active member.
    pub async fn project_with_members(
        &self,
        versions: &[VersionId],
        logins: &[&str],
    ) -> ProjectSetup {
        let (client, respondents) = self.client_with(logins).await;
        let projects = self.projects();
        let draft = ProjectDraft::new(
            client.id,
            "Annual review",
            None,
            None,
            None,
            versions.to_vec(),
        )
        .unwrap();
        let (project, bindings) = projects.create(&draft, Timestamp::now()).await.unwrap();
        for respondent in &respondents {
            projects
                .add_member(project.id(), respondent.id, Timestamp::now())
                .await
                .unwrap();
        }
        ProjectSetup {
            project,
            bindings,
            respondents,
        }
    }
}

impl Fixture {
    /// A lead from a completed single-answer ("Yes") assessment of a fresh
    /// public type named after `email`.
    pub async fn lead(&self, email: &str) -> Lead {
        let (assessment_type, tree) = self
            .public_type(&format!("Type for {}", email), &[("Identity", &[true])], "")
            .await;
        let assessment = self
            .public()
            .create(PublicAssessmentDraft {
                type_id: assessment_type.id,
                version_id: tree.version.id(),
                token: ResultToken::generate(),
                group_tag: None,
                source_ip: None,
                started_at: Timestamp::now(),
            })
            .await
            .unwrap();
        let responses = [PublicResponse {
            public_assessment_id: assessment.id(),
            question_id: tree.domains[0].questions[0].id,
            value: PublicAnswer::from_value(5).unwrap(),
            answered_at: Timestamp::now(),
        }];
        self.responses()
            .upsert_public_responses(assessment.id(), &responses)
            .await
            .unwrap();
        let contact = ContactDetails::parse(ContactInput {
            email: Some(email.into()),
            company: Some("Acme".into()),
            ..Default::default()
        })
        .unwrap();
        let (assessment, _) = self
            .public()
            .complete(assessment.id(), contact, Timestamp::now())
            .await
            .unwrap();
        let scores = score_public(&tree.light_subset(), &responses);
        let draft = LeadDraft::from_assessment(
            &assessment,
            &assessment_type.name,
            &scores,
            Timestamp::now(),
        )
        .unwrap();
        self.leads().insert_if_absent(&draft).await.unwrap().0
    }
}

pub(crate) fn blueprint(domains: &[(&str, &[bool])]) -> VersionBlueprint {
    VersionBlueprint {
        domains: domains
            .iter()
            .enumerate()
            .map(|(d, (name, lights))| DomainBlueprint {
                fields: DomainFields::new(name, None, true).unwrap(),
                position: d as i32 + 1,
                questions: lights
                    .iter()
                    .enumerate()
                    .map(|(q, light)| {
                        (
                            QuestionFields::new(
                                &format!("{} question {}", name, q + 1),
                                None,
                                None,
                                None,
                                *light,
                                true,
                            )
                            .unwrap(),
                            q as i32 + 1,
                        )
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub(crate) fn admin() -> Principal {
    Principal::admin("admin@platform.test", "Admin")
}

pub(crate) fn principal_for(respondent: &Respondent) -> Principal {
    Principal::Respondent {
        respondent_id: respondent.id,
        client_id: respondent.client_id,
        login: respondent.login.to_string(),
        display_name: respondent.display_name.clone(),
    }
}
