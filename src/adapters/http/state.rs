//! Shared application state for the HTTP surface.

use std::sync::Arc;

use crate::adapters::auth::{AdminAccount, InMemorySessionStore, StaticCredentialProvider};
use crate::application::handlers::auth::{LoginHandler, LogoutHandler};
use crate::application::handlers::catalog::{
    CatalogQueries, CloneTypeHandler, ConfigureIntakeHandler, CreateDraftHandler,
    CreateTypeHandler, DeleteDraftHandler, EditDraftHandler, PublishVersionHandler,
    UpdateTypeHandler, UpdateVersionNotesHandler,
};
use crate::application::handlers::clients::{
    ClientQueries, CreateClientHandler, CreateRespondentHandler,
};
use crate::application::handlers::lead::{
    CommentOnLeadHandler, DeleteLeadHandler, LeadQueries, MaterializeLeadHandler,
    UpdateLeadHandler,
};
use crate::application::handlers::project::{
    AddRespondentHandler, CreateProjectHandler, FinalizeAssessmentHandler,
    ProjectEstimateHandler, ProjectQueries, ProjectStatisticsHandler, QuestionSheetHandler,
    RecordResponseHandler, ReleaseProjectHandler, RemoveRespondentHandler, UpdateProjectHandler,
};
use crate::application::handlers::public::{
    CompleteIntakeHandler, DeliverResultHandler, FetchResultHandler, GetContactStepHandler,
    GetDomainStepHandler, StartIntakeHandler, SubmitDomainHandler,
};
use crate::application::handlers::statistics::GroupStatisticsHandler;
use crate::ports::{
    AuditLog, CatalogRepository, ClientRepository, CredentialProvider, IntakeSessionStore,
    LeadRepository, Notifier, ProjectRepository, PublicAssessmentRepository,
    RecommendationGenerator, ResponseRepository, SessionIssuer, SessionValidator,
};

/// A backing store implementing every repository port.
pub trait Repositories:
    CatalogRepository
    + ClientRepository
    + ProjectRepository
    + ResponseRepository
    + PublicAssessmentRepository
    + LeadRepository
    + IntakeSessionStore
    + Clone
    + 'static
{
}

impl<T> Repositories for T where
    T: CatalogRepository
        + ClientRepository
        + ProjectRepository
        + ResponseRepository
        + PublicAssessmentRepository
        + LeadRepository
        + IntakeSessionStore
        + Clone
        + 'static
{
}

/// Shared application state containing all dependencies.
///
/// Cloned for each request; handlers are built on demand from the
/// Arc-wrapped ports.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub responses: Arc<dyn ResponseRepository>,
    pub public: Arc<dyn PublicAssessmentRepository>,
    pub leads: Arc<dyn LeadRepository>,
    pub intake: Arc<dyn IntakeSessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub recommender: Option<Arc<dyn RecommendationGenerator>>,
    pub audit: Arc<dyn AuditLog>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub issuer: Arc<dyn SessionIssuer>,
    pub validator: Arc<dyn SessionValidator>,
    pub public_base_url: Option<String>,
}

impl AppState {
    pub fn new<S: Repositories>(
        store: S,
        sessions: InMemorySessionStore,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditLog>,
        admin: Option<AdminAccount>,
    ) -> Self {
        let clients: Arc<dyn ClientRepository> = Arc::new(store.clone());
        let sessions = Arc::new(sessions);
        Self {
            catalog: Arc::new(store.clone()),
            credentials: Arc::new(StaticCredentialProvider::new(admin, clients.clone())),
            clients,
            projects: Arc::new(store.clone()),
            responses: Arc::new(store.clone()),
            public: Arc::new(store.clone()),
            leads: Arc::new(store.clone()),
            intake: Arc::new(store),
            notifier,
            recommender: None,
            audit,
            issuer: sessions.clone(),
            validator: sessions,
            public_base_url: None,
        }
    }

    pub fn with_recommender(mut self, recommender: Option<Arc<dyn RecommendationGenerator>>) -> Self {
        self.recommender = recommender;
        self
    }

    pub fn with_public_base_url(mut self, base: Option<String>) -> Self {
        self.public_base_url = base;
        self
    }

    // Auth

    pub fn login_handler(&self) -> LoginHandler {
        LoginHandler::new(
            self.credentials.clone(),
            self.issuer.clone(),
            self.clients.clone(),
            self.audit.clone(),
        )
    }

    pub fn logout_handler(&self) -> LogoutHandler {
        LogoutHandler::new(self.issuer.clone(), self.audit.clone())
    }

    // Catalog

    pub fn catalog_queries(&self) -> CatalogQueries {
        CatalogQueries::new(self.catalog.clone())
    }

    pub fn create_type_handler(&self) -> CreateTypeHandler {
        CreateTypeHandler::new(self.catalog.clone(), self.audit.clone())
    }

    pub fn update_type_handler(&self) -> UpdateTypeHandler {
        UpdateTypeHandler::new(self.catalog.clone(), self.audit.clone())
    }

    pub fn clone_type_handler(&self) -> CloneTypeHandler {
        CloneTypeHandler::new(self.catalog.clone(), self.audit.clone())
    }

    pub fn configure_intake_handler(&self) -> ConfigureIntakeHandler {
        ConfigureIntakeHandler::new(self.catalog.clone(), self.audit.clone())
    }

    pub fn create_draft_handler(&self) -> CreateDraftHandler {
        CreateDraftHandler::new(self.catalog.clone())
    }

    pub fn update_version_notes_handler(&self) -> UpdateVersionNotesHandler {
        UpdateVersionNotesHandler::new(self.catalog.clone())
    }

    pub fn publish_version_handler(&self) -> PublishVersionHandler {
        PublishVersionHandler::new(self.catalog.clone(), self.audit.clone())
    }

    pub fn delete_draft_handler(&self) -> DeleteDraftHandler {
        DeleteDraftHandler::new(self.catalog.clone(), self.audit.clone())
    }

    pub fn edit_draft_handler(&self) -> EditDraftHandler {
        EditDraftHandler::new(self.catalog.clone())
    }

    // Clients

    pub fn client_queries(&self) -> ClientQueries {
        ClientQueries::new(self.clients.clone())
    }

    pub fn create_client_handler(&self) -> CreateClientHandler {
        CreateClientHandler::new(self.clients.clone(), self.audit.clone())
    }

    pub fn create_respondent_handler(&self) -> CreateRespondentHandler {
        CreateRespondentHandler::new(
            self.clients.clone(),
            self.credentials.clone(),
            self.audit.clone(),
        )
    }

    // Projects

    pub fn project_queries(&self) -> ProjectQueries {
        ProjectQueries::new(self.clients.clone(), self.projects.clone())
    }

    pub fn create_project_handler(&self) -> CreateProjectHandler {
        CreateProjectHandler::new(self.projects.clone(), self.audit.clone())
    }

    pub fn update_project_handler(&self) -> UpdateProjectHandler {
        UpdateProjectHandler::new(self.projects.clone(), self.audit.clone())
    }

    pub fn add_respondent_handler(&self) -> AddRespondentHandler {
        AddRespondentHandler::new(self.projects.clone(), self.audit.clone())
    }

    pub fn remove_respondent_handler(&self) -> RemoveRespondentHandler {
        RemoveRespondentHandler::new(self.projects.clone(), self.audit.clone())
    }

    pub fn estimate_handler(&self) -> ProjectEstimateHandler {
        ProjectEstimateHandler::new(
            self.catalog.clone(),
            self.clients.clone(),
            self.projects.clone(),
        )
    }

    pub fn question_sheet_handler(&self) -> QuestionSheetHandler {
        QuestionSheetHandler::new(
            self.catalog.clone(),
            self.projects.clone(),
            self.responses.clone(),
        )
    }

    pub fn record_response_handler(&self) -> RecordResponseHandler {
        RecordResponseHandler::new(
            self.projects.clone(),
            self.responses.clone(),
            self.audit.clone(),
        )
    }

    pub fn finalize_handler(&self) -> FinalizeAssessmentHandler {
        FinalizeAssessmentHandler::new(self.projects.clone(), self.audit.clone())
    }

    pub fn release_handler(&self) -> ReleaseProjectHandler {
        ReleaseProjectHandler::new(self.projects.clone(), self.audit.clone())
    }

    pub fn project_statistics_handler(&self) -> ProjectStatisticsHandler {
        ProjectStatisticsHandler::new(
            self.catalog.clone(),
            self.projects.clone(),
            self.responses.clone(),
        )
    }

    // Public intake

    fn materialize_handler(&self) -> Arc<MaterializeLeadHandler> {
        Arc::new(MaterializeLeadHandler::new(
            self.catalog.clone(),
            self.public.clone(),
            self.responses.clone(),
            self.leads.clone(),
            self.notifier.clone(),
            self.audit.clone(),
        ))
    }

    pub fn start_intake_handler(&self) -> StartIntakeHandler {
        StartIntakeHandler::new(self.catalog.clone(), self.public.clone(), self.intake.clone())
    }

    pub fn domain_step_handler(&self) -> GetDomainStepHandler {
        GetDomainStepHandler::new(
            self.catalog.clone(),
            self.public.clone(),
            self.responses.clone(),
            self.intake.clone(),
        )
    }

    pub fn submit_domain_handler(&self) -> SubmitDomainHandler {
        SubmitDomainHandler::new(
            self.catalog.clone(),
            self.public.clone(),
            self.responses.clone(),
            self.intake.clone(),
        )
    }

    pub fn contact_step_handler(&self) -> GetContactStepHandler {
        GetContactStepHandler::new(self.catalog.clone(), self.public.clone(), self.intake.clone())
    }

    pub fn complete_intake_handler(&self) -> CompleteIntakeHandler {
        CompleteIntakeHandler::new(
            self.public.clone(),
            self.intake.clone(),
            self.materialize_handler(),
            self.audit.clone(),
        )
    }

    pub fn fetch_result_handler(&self) -> FetchResultHandler {
        FetchResultHandler::new(
            self.catalog.clone(),
            self.public.clone(),
            self.responses.clone(),
            self.recommender.clone(),
        )
    }

    pub fn deliver_result_handler(&self) -> DeliverResultHandler {
        DeliverResultHandler::new(
            self.catalog.clone(),
            self.public.clone(),
            self.responses.clone(),
            self.recommender.clone(),
            self.materialize_handler(),
            self.notifier.clone(),
        )
        .with_public_base_url(self.public_base_url.clone())
    }

    // Leads and groups

    pub fn lead_queries(&self) -> LeadQueries {
        LeadQueries::new(self.leads.clone())
    }

    pub fn update_lead_handler(&self) -> UpdateLeadHandler {
        UpdateLeadHandler::new(self.leads.clone(), self.audit.clone())
    }

    pub fn comment_lead_handler(&self) -> CommentOnLeadHandler {
        CommentOnLeadHandler::new(self.leads.clone(), self.audit.clone())
    }

    pub fn delete_lead_handler(&self) -> DeleteLeadHandler {
        DeleteLeadHandler::new(self.leads.clone(), self.audit.clone())
    }

    pub fn group_statistics_handler(&self) -> GroupStatisticsHandler {
        GroupStatisticsHandler::new(
            self.catalog.clone(),
            self.public.clone(),
            self.responses.clone(),
        )
    }
}
