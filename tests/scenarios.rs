//! End-to-end scenarios against the application layer, wired the way the
//! server wires it but on the in-memory store.

use std::sync::Arc;

use maturity_assessment::adapters::audit::InMemoryAuditLog;
use maturity_assessment::adapters::auth::InMemorySessionStore;
use maturity_assessment::adapters::http::AppState;
use maturity_assessment::adapters::notify::InMemoryNotifier;
use maturity_assessment::adapters::InMemoryStore;
use maturity_assessment::application::handlers::catalog::{
    ConfigureIntakeCommand, CreateDraftCommand, CreateTypeCommand, DraftEdit, DraftEditResult,
    PublishVersionCommand,
};
use maturity_assessment::application::handlers::clients::{
    CreateClientCommand, CreateRespondentCommand,
};
use maturity_assessment::application::handlers::project::{
    AddRespondentCommand, CreateProjectCommand, FinalizeAssessmentCommand, ProjectEstimateQuery,
    RecordResponseCommand,
};
use maturity_assessment::application::handlers::public::{
    CompleteIntakeCommand, FetchResultQuery, StartIntakeCommand, SubmitDomainCommand,
};
use maturity_assessment::application::handlers::statistics::GroupStatisticsQuery;
use maturity_assessment::domain::catalog::{DomainFields, QuestionFields, VersionStatus};
use maturity_assessment::domain::foundation::{
    ErrorCode, Principal, QuestionId, TypeId, VersionId,
};
use maturity_assessment::domain::lead::LeadFilter;
use maturity_assessment::domain::project::ProjectAssessment;
use maturity_assessment::domain::public::{ContactInput, NextStep};

struct Harness {
    state: AppState,
    notifier: InMemoryNotifier,
    admin: Principal,
}

impl Harness {
    fn new() -> Self {
        let notifier = InMemoryNotifier::new();
        let state = AppState::new(
            InMemoryStore::new(),
            InMemorySessionStore::new(3600),
            Arc::new(notifier.clone()),
            Arc::new(InMemoryAuditLog::new()),
            None,
        );
        Self {
            state,
            notifier,
            admin: Principal::admin("admin@maturity.test", "Admin"),
        }
    }

    /// Creates a type with one domain "D" holding one question per light
    /// flag, and returns the draft "1.0" with its question ids.
    async fn draft_type(&self, name: &str, light: &[bool]) -> (TypeId, VersionId, Vec<QuestionId>) {
        let created = self
            .state
            .create_type_handler()
            .handle(CreateTypeCommand {
                name: name.into(),
                description: None,
                actor: self.admin.clone(),
            })
            .await
            .unwrap();
        let version_id = created.version.id();

        let DraftEditResult::Domain(domain) = self
            .state
            .edit_draft_handler()
            .handle(DraftEdit::AddDomain {
                version_id,
                fields: DomainFields::new("D", None, true).unwrap(),
            })
            .await
            .unwrap()
        else {
            panic!("expected a domain");
        };

        let mut questions = Vec::new();
        for (i, flag) in light.iter().enumerate() {
            let fields =
                QuestionFields::new(&format!("q{}", i + 1), None, None, None, *flag, true).unwrap();
            match self
                .state
                .edit_draft_handler()
                .handle(DraftEdit::AddQuestion {
                    domain_id: domain.id,
                    fields,
                })
                .await
                .unwrap()
            {
                DraftEditResult::Question(question) => questions.push(question.id),
                other => panic!("expected a question, got {:?}", other),
            }
        }
        (created.assessment_type.id, version_id, questions)
    }

    async fn publish(&self, version_id: VersionId) {
        self.state
            .publish_version_handler()
            .handle(PublishVersionCommand {
                version_id,
                actor: self.admin.clone(),
            })
            .await
            .unwrap();
    }

    /// A published type open to the public with every question light.
    async fn public_type(&self, questions: usize) -> (TypeId, Vec<QuestionId>) {
        let (type_id, version_id, ids) = self.draft_type("Security", &vec![true; questions]).await;
        self.publish(version_id).await;
        self.state
            .configure_intake_handler()
            .handle(ConfigureIntakeCommand {
                type_id,
                enabled: true,
                recipients: "ops@acme.test".into(),
                cta_text: Some("Talk to us".into()),
                actor: self.admin.clone(),
            })
            .await
            .unwrap();
        (type_id, ids)
    }

    /// Runs one visitor through the single-domain intake and returns the
    /// result token.
    async fn visit(
        &self,
        type_id: TypeId,
        group: Option<&str>,
        answers: Vec<(QuestionId, i32)>,
        email: &str,
    ) -> String {
        let started = self
            .state
            .start_intake_handler()
            .handle(StartIntakeCommand {
                type_id,
                group: group.map(str::to_string),
                source_ip: None,
                resume: None,
            })
            .await
            .unwrap();
        assert_eq!(started.step, NextStep::Domain(0));
        let handle = started.session.handle;

        let next = self
            .state
            .submit_domain_handler()
            .handle(SubmitDomainCommand {
                type_id,
                handle,
                index: 0,
                answers,
            })
            .await
            .unwrap();
        assert_eq!(next, NextStep::Contact);

        let completed = self
            .state
            .complete_intake_handler()
            .handle(CompleteIntakeCommand {
                type_id,
                handle,
                contact: contact(email),
                ip: None,
            })
            .await
            .unwrap();
        completed.assessment.token().as_str().to_string()
    }
}

fn contact(email: &str) -> ContactInput {
    ContactInput {
        name: Some("Dana".into()),
        email: Some(email.into()),
        company: Some("Acme".into()),
        ..ContactInput::default()
    }
}

fn respondent_principal(respondent: &maturity_assessment::domain::client::Respondent) -> Principal {
    Principal::Respondent {
        respondent_id: respondent.id,
        client_id: respondent.client_id,
        login: respondent.login.as_str().to_string(),
        display_name: respondent.display_name.clone(),
    }
}

#[tokio::test]
async fn published_version_exposes_light_subset() {
    let h = Harness::new();
    let (_, version_id, questions) = h.draft_type("Cloud", &[true, false]).await;
    h.publish(version_id).await;

    let tree = h.state.catalog_queries().version_tree(version_id).await.unwrap();
    assert_eq!(tree.version.label(), "1.0");
    assert_eq!(tree.version.status(), VersionStatus::Published);

    let light = h.state.catalog_queries().light_subset(version_id).await.unwrap();
    assert_eq!(light.domains.len(), 1);
    let ids: Vec<QuestionId> = light.domains[0].questions.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![questions[0]]);
}

struct ProjectRun {
    binding: ProjectAssessment,
    members: Vec<Principal>,
    questions: Vec<QuestionId>,
    version_id: VersionId,
    project_id: maturity_assessment::domain::foundation::ProjectId,
}

async fn project_run(h: &Harness) -> ProjectRun {
    let (_, version_id, questions) = h.draft_type("Data", &[true, false]).await;
    h.publish(version_id).await;

    let client = h
        .state
        .create_client_handler()
        .handle(CreateClientCommand {
            trade_name: "Acme".into(),
            legal_name: None,
            tax_id: None,
            location: None,
            segment: None,
            actor: h.admin.clone(),
        })
        .await
        .unwrap();

    let created = h
        .state
        .create_project_handler()
        .handle(CreateProjectCommand {
            client_id: client.id,
            name: "Annual review".into(),
            description: None,
            evaluator_name: None,
            evaluator_email: None,
            version_ids: vec![version_id],
            actor: h.admin.clone(),
        })
        .await
        .unwrap();
    let project_id = created.project.id();

    let mut members = Vec::new();
    for login in ["a@acme.test", "b@acme.test"] {
        let respondent = h
            .state
            .create_respondent_handler()
            .handle(CreateRespondentCommand {
                client_id: client.id,
                login: login.into(),
                secret: "correct horse battery".into(),
                display_name: login.into(),
                role: None,
                department: None,
                actor: h.admin.clone(),
            })
            .await
            .unwrap();
        h.state
            .add_respondent_handler()
            .handle(AddRespondentCommand {
                project_id,
                respondent_id: respondent.id,
                actor: h.admin.clone(),
            })
            .await
            .unwrap();
        members.push(respondent_principal(&respondent));
    }

    ProjectRun {
        binding: created.bindings[0].clone(),
        members,
        questions,
        version_id,
        project_id,
    }
}

async fn answer(h: &Harness, run: &ProjectRun, member: usize, question: QuestionId, score: i32) {
    h.state
        .record_response_handler()
        .handle(RecordResponseCommand {
            binding_id: run.binding.id(),
            question_id: question,
            score: Some(score),
            comment: None,
            actor: run.members[member].clone(),
            ip: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn collaborative_answers_finalize_and_lock() {
    let h = Harness::new();
    let run = project_run(&h).await;

    answer(&h, &run, 0, run.questions[0], 4).await;
    answer(&h, &run, 1, run.questions[1], 2).await;

    let estimate = h
        .state
        .estimate_handler()
        .handle(ProjectEstimateQuery {
            project_id: run.project_id,
            actor: h.admin.clone(),
        })
        .await
        .unwrap();
    assert_eq!(estimate.bindings[0].progress.answered, 2);
    assert_eq!(estimate.bindings[0].percentage, 100.0);

    let finalized = h
        .state
        .finalize_handler()
        .handle(FinalizeAssessmentCommand {
            binding_id: run.binding.id(),
            actor: run.members[0].clone(),
            ip: None,
        })
        .await
        .unwrap();
    assert!(finalized.is_finalized());

    let err = h
        .state
        .record_response_handler()
        .handle(RecordResponseCommand {
            binding_id: run.binding.id(),
            question_id: run.questions[0],
            score: Some(1),
            comment: None,
            actor: run.members[1].clone(),
            ip: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::LockedAssessment);
}

#[tokio::test]
async fn finalize_refuses_incomplete_binding() {
    let h = Harness::new();
    let run = project_run(&h).await;
    answer(&h, &run, 0, run.questions[0], 3).await;

    let err = h
        .state
        .finalize_handler()
        .handle(FinalizeAssessmentCommand {
            binding_id: run.binding.id(),
            actor: run.members[0].clone(),
            ip: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PreconditionFailed);
}

#[tokio::test]
async fn binding_stays_on_its_version_after_republish() {
    let h = Harness::new();
    let run = project_run(&h).await;

    let draft = h
        .state
        .create_draft_handler()
        .handle(CreateDraftCommand {
            base_version_id: run.version_id,
            label: "1.1".into(),
            notes: Some("Reworded".into()),
            actor: h.admin.clone(),
        })
        .await
        .unwrap();
    h.publish(draft.id()).await;

    let old = h.state.catalog_queries().version_tree(run.version_id).await.unwrap();
    assert_eq!(old.version.status(), VersionStatus::Archived);

    let estimate = h
        .state
        .estimate_handler()
        .handle(ProjectEstimateQuery {
            project_id: run.project_id,
            actor: h.admin.clone(),
        })
        .await
        .unwrap();
    assert_eq!(estimate.bindings[0].binding.version_id(), run.version_id);
    assert_eq!(estimate.bindings[0].version_label, "1.0");
}

#[tokio::test]
async fn public_visit_becomes_scored_lead() {
    let h = Harness::new();
    let (type_id, questions) = h.public_type(1).await;

    let token = h
        .visit(type_id, Some("campaign-Q3"), vec![(questions[0], 5)], "dana@acme.test")
        .await;

    let leads = h
        .state
        .lead_queries()
        .list(&h.admin, &LeadFilter::default())
        .await
        .unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].overall_score, 100.0);
    assert_eq!(h.notifier.lead_notices().await.len(), 1);

    let summary = h
        .state
        .fetch_result_handler()
        .handle(FetchResultQuery {
            type_id: Some(type_id),
            token,
        })
        .await
        .unwrap();
    assert_eq!(summary.overall, 100.0);
    assert_eq!(summary.responses, 1);
}

#[tokio::test]
async fn group_statistics_over_completed_visits() {
    let h = Harness::new();
    let (type_id, q) = h.public_type(5).await;

    let runs = [[5, 0, 0, 0, 0], [5, 5, 5, 0, 0], [5, 5, 5, 5, 5]];
    for (i, values) in runs.iter().enumerate() {
        let answers = q.iter().copied().zip(values.iter().copied()).collect();
        h.visit(type_id, Some("campaign-Q3"), answers, &format!("visitor{}@acme.test", i))
            .await;
    }
    let untagged = q.iter().map(|id| (*id, 0)).collect();
    h.visit(type_id, None, untagged, "walk-in@acme.test").await;

    let statistics = |group: Option<&str>| GroupStatisticsQuery {
        type_id,
        group: group.map(str::to_string),
        actor: h.admin.clone(),
    };

    let tagged = h
        .state
        .group_statistics_handler()
        .statistics(statistics(Some("campaign-Q3")))
        .await
        .unwrap();
    assert_eq!(tagged.group_label, "campaign-Q3");
    assert_eq!(tagged.statistics.total_count, 3);
    assert_eq!(tagged.statistics.mean_overall, 60.0);
    assert_eq!(tagged.statistics.min_overall, 20.0);
    assert_eq!(tagged.statistics.max_overall, 100.0);

    let general = h
        .state
        .group_statistics_handler()
        .statistics(statistics(None))
        .await
        .unwrap();
    assert_eq!(general.group_label, "General");
    assert_eq!(general.statistics.total_count, 4);
    assert_eq!(general.statistics.min_overall, 0.0);
}

#[tokio::test]
async fn repeated_completion_keeps_a_single_lead() {
    let h = Harness::new();
    let (type_id, questions) = h.public_type(1).await;

    let started = h
        .state
        .start_intake_handler()
        .handle(StartIntakeCommand {
            type_id,
            group: None,
            source_ip: None,
            resume: None,
        })
        .await
        .unwrap();
    let handle = started.session.handle;
    h.state
        .submit_domain_handler()
        .handle(SubmitDomainCommand {
            type_id,
            handle,
            index: 0,
            answers: vec![(questions[0], 3)],
        })
        .await
        .unwrap();

    let complete = CompleteIntakeCommand {
        type_id,
        handle,
        contact: contact("dana@acme.test"),
        ip: None,
    };
    let first = h.state.complete_intake_handler().handle(complete.clone()).await.unwrap();
    let second = h.state.complete_intake_handler().handle(complete).await.unwrap();

    assert!(first.completed_now);
    assert!(!second.completed_now);
    assert_eq!(first.lead.id, second.lead.id);

    let leads = h
        .state
        .lead_queries()
        .list(&h.admin, &LeadFilter::default())
        .await
        .unwrap();
    assert_eq!(leads.len(), 1);
    let detail = h.state.lead_queries().detail(&h.admin, first.lead.id).await.unwrap();
    assert_eq!(detail.history.len(), 1);
    assert_eq!(h.notifier.lead_notices().await.len(), 1);
}
