//! Loading helpers shared by the public intake handlers.

use crate::application::handlers::lookup::{require_public_assessment, require_tree, require_type};
use crate::domain::catalog::{AssessmentType, LightSubset, VersionTree};
use crate::domain::foundation::{DomainError, ErrorCode, TypeId};
use crate::domain::public::{IntakeSession, PublicAssessment, SessionHandle};
use crate::ports::{CatalogRepository, IntakeSessionStore, PublicAssessmentRepository};

/// A type open for intake with its published questionnaire.
pub(crate) struct IntakeContext {
    pub tree: VersionTree,
    pub subset: LightSubset,
}

fn no_light_questions(assessment_type: &AssessmentType) -> DomainError {
    DomainError::new(
        ErrorCode::NoLightQuestions,
        format!("'{}' has no public questionnaire", assessment_type.name),
    )
    .with_detail("type_id", assessment_type.id.to_string())
}

/// Fails with `NoLightQuestions` when nothing is published or the
/// published version flags no light question.
pub(crate) async fn load_intake(
    catalog: &dyn CatalogRepository,
    type_id: TypeId,
) -> Result<IntakeContext, DomainError> {
    let assessment_type = require_type(catalog, type_id).await?;
    assessment_type.ensure_public_intake()?;
    let Some(version) = catalog.find_published(type_id).await? else {
        return Err(no_light_questions(&assessment_type));
    };
    let tree = require_tree(catalog, version.id()).await?;
    let subset = tree.light_subset();
    if subset.is_empty() {
        return Err(no_light_questions(&assessment_type));
    }
    Ok(IntakeContext {
        tree,
        subset,
    })
}

/// Resolves a visitor's handle for `type_id` together with its assessment.
pub(crate) async fn load_session(
    sessions: &dyn IntakeSessionStore,
    public: &dyn PublicAssessmentRepository,
    type_id: TypeId,
    handle: &SessionHandle,
) -> Result<(IntakeSession, PublicAssessment), DomainError> {
    let session = sessions
        .find(handle)
        .await?
        .filter(|s| s.type_id == type_id)
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::IntakeSessionNotFound,
                "Intake session not found; start the assessment again",
            )
        })?;
    let assessment = require_public_assessment(public, session.public_assessment_id).await?;
    Ok((session, assessment))
}

/// Light subset of the version an assessment was started on.
pub(crate) async fn assessment_subset(
    catalog: &dyn CatalogRepository,
    assessment: &PublicAssessment,
) -> Result<LightSubset, DomainError> {
    Ok(require_tree(catalog, assessment.version_id())
        .await?
        .light_subset())
}
