//! Ports - interfaces between the application core and the outside world.
//!
//! Every external dependency (storage, email, text generation, auth,
//! auditing) is reached through one of these traits so that the in-memory
//! and PostgreSQL adapters are interchangeable.

mod audit_log;
mod catalog_repository;
mod client_repository;
mod credential_provider;
mod email_transport;
mod intake_session_store;
mod lead_repository;
mod notifier;
mod project_repository;
mod public_assessment_repository;
mod recommendation_generator;
mod response_repository;
mod session_validator;

pub use audit_log::{record_quietly, AuditLog};
pub use catalog_repository::CatalogRepository;
pub use client_repository::ClientRepository;
pub use credential_provider::CredentialProvider;
pub use email_transport::{EmailTransport, OutgoingEmail};
pub use intake_session_store::IntakeSessionStore;
pub use lead_repository::LeadRepository;
pub use notifier::{NewLeadNotice, NotificationError, Notifier, ResultNotice};
pub use project_repository::ProjectRepository;
pub use public_assessment_repository::PublicAssessmentRepository;
pub use recommendation_generator::{
    RecommendationError, RecommendationGenerator, RecommendationRequest,
};
pub use response_repository::ResponseRepository;
pub use session_validator::{SessionIssuer, SessionValidator};
