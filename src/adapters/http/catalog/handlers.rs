//! HTTP handlers for the questionnaire catalog (administrators only).

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::dto::{
    CloneTypeRequest, ConfigureIntakeRequest, CreateDraftRequest, CreateTypeRequest,
    DomainRequest, QuestionRequest, ReorderRequest, TypeCreatedResponse, UpdateNotesRequest,
    UpdateTypeRequest,
};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAdmin;
use crate::adapters::http::state::AppState;
use crate::application::handlers::catalog::{
    CloneTypeCommand, ConfigureIntakeCommand, CreateDraftCommand, CreateTypeCommand,
    DeleteDraftCommand, DraftEdit, DraftEditResult, PublishVersionCommand, UpdateTypeCommand,
    UpdateVersionNotesCommand,
};
use crate::domain::catalog::{DomainFields, QuestionFields};
use crate::domain::foundation::{DomainError, DomainId, QuestionId, TypeId, VersionId};

fn domain_fields(req: DomainRequest) -> Result<DomainFields, DomainError> {
    Ok(DomainFields::new(&req.name, req.description, req.active)?)
}

fn question_fields(req: QuestionRequest) -> Result<QuestionFields, DomainError> {
    Ok(QuestionFields::new(
        &req.text,
        req.description,
        req.reference,
        req.recommendation,
        req.light,
        req.active,
    )?)
}

fn edit_response(result: DraftEditResult, status: StatusCode) -> Response {
    match result {
        DraftEditResult::Domain(domain) => (status, Json(domain)).into_response(),
        DraftEditResult::Question(question) => (status, Json(question)).into_response(),
        DraftEditResult::Done => StatusCode::NO_CONTENT.into_response(),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Types
// ════════════════════════════════════════════════════════════════════════════════

/// GET /admin/types
pub async fn list_types(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog_queries().list_types().await?))
}

/// POST /admin/types
pub async fn create_type(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(req): Json<CreateTypeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_type_handler()
        .handle(CreateTypeCommand {
            name: req.name,
            description: req.description,
            actor,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TypeCreatedResponse {
            assessment_type: result.assessment_type,
            version: result.version,
        }),
    ))
}

/// GET /admin/types/:id
pub async fn get_type(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(type_id): Path<TypeId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog_queries().type_detail(type_id).await?))
}

/// PATCH /admin/types/:id
pub async fn update_type(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(type_id): Path<TypeId>,
    Json(req): Json<UpdateTypeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .update_type_handler()
        .handle(UpdateTypeCommand {
            type_id,
            name: req.name,
            description: req.description,
            active: req.active,
            actor,
        })
        .await?;
    Ok(Json(updated))
}

/// POST /admin/types/:id/clone
pub async fn clone_type(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(type_id): Path<TypeId>,
    Json(req): Json<CloneTypeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .clone_type_handler()
        .handle(CloneTypeCommand {
            source_type_id: type_id,
            name: req.name,
            description: req.description,
            actor,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TypeCreatedResponse {
            assessment_type: result.assessment_type,
            version: result.version,
        }),
    ))
}

/// PUT /admin/types/:id/intake
pub async fn configure_intake(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(type_id): Path<TypeId>,
    Json(req): Json<ConfigureIntakeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .configure_intake_handler()
        .handle(ConfigureIntakeCommand {
            type_id,
            enabled: req.enabled,
            recipients: req.recipients,
            cta_text: req.cta_text,
            actor,
        })
        .await?;
    Ok(Json(updated))
}

// ════════════════════════════════════════════════════════════════════════════════
// Versions
// ════════════════════════════════════════════════════════════════════════════════

/// GET /admin/versions/:id - full tree
pub async fn get_version(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(version_id): Path<VersionId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog_queries().version_tree(version_id).await?))
}

/// GET /admin/versions/:id/light - light questions only
pub async fn get_light_subset(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(version_id): Path<VersionId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog_queries().light_subset(version_id).await?))
}

/// PATCH /admin/versions/:id - release notes
pub async fn update_version_notes(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(version_id): Path<VersionId>,
    Json(req): Json<UpdateNotesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let version = state
        .update_version_notes_handler()
        .handle(UpdateVersionNotesCommand {
            version_id,
            notes: req.notes,
        })
        .await?;
    Ok(Json(version))
}

/// DELETE /admin/versions/:id - drafts only
pub async fn delete_draft(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(version_id): Path<VersionId>,
) -> Result<StatusCode, ApiError> {
    state
        .delete_draft_handler()
        .handle(DeleteDraftCommand { version_id, actor })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/versions/:id/publish
pub async fn publish_version(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(version_id): Path<VersionId>,
) -> Result<impl IntoResponse, ApiError> {
    let version = state
        .publish_version_handler()
        .handle(PublishVersionCommand { version_id, actor })
        .await?;
    Ok(Json(version))
}

/// POST /admin/versions/:id/drafts - branch a new draft from this version
pub async fn create_draft(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(version_id): Path<VersionId>,
    Json(req): Json<CreateDraftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = state
        .create_draft_handler()
        .handle(CreateDraftCommand {
            base_version_id: version_id,
            label: req.label,
            notes: req.notes,
            actor,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(draft)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Draft structure
// ════════════════════════════════════════════════════════════════════════════════

/// POST /admin/versions/:id/domains
pub async fn add_domain(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(version_id): Path<VersionId>,
    Json(req): Json<DomainRequest>,
) -> Result<Response, ApiError> {
    let fields = domain_fields(req)?;
    let result = state
        .edit_draft_handler()
        .handle(DraftEdit::AddDomain { version_id, fields })
        .await?;
    Ok(edit_response(result, StatusCode::CREATED))
}

/// PUT /admin/versions/:id/domains/order
pub async fn reorder_domains(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(version_id): Path<VersionId>,
    Json(req): Json<ReorderRequest<DomainId>>,
) -> Result<Response, ApiError> {
    let result = state
        .edit_draft_handler()
        .handle(DraftEdit::ReorderDomains {
            version_id,
            order: req.order,
        })
        .await?;
    Ok(edit_response(result, StatusCode::OK))
}

/// PUT /admin/domains/:id
pub async fn update_domain(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(domain_id): Path<DomainId>,
    Json(req): Json<DomainRequest>,
) -> Result<Response, ApiError> {
    let fields = domain_fields(req)?;
    let result = state
        .edit_draft_handler()
        .handle(DraftEdit::UpdateDomain { domain_id, fields })
        .await?;
    Ok(edit_response(result, StatusCode::OK))
}

/// DELETE /admin/domains/:id
pub async fn delete_domain(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(domain_id): Path<DomainId>,
) -> Result<Response, ApiError> {
    let result = state
        .edit_draft_handler()
        .handle(DraftEdit::DeleteDomain { domain_id })
        .await?;
    Ok(edit_response(result, StatusCode::OK))
}

/// POST /admin/domains/:id/questions
pub async fn add_question(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(domain_id): Path<DomainId>,
    Json(req): Json<QuestionRequest>,
) -> Result<Response, ApiError> {
    let fields = question_fields(req)?;
    let result = state
        .edit_draft_handler()
        .handle(DraftEdit::AddQuestion { domain_id, fields })
        .await?;
    Ok(edit_response(result, StatusCode::CREATED))
}

/// PUT /admin/domains/:id/questions/order
pub async fn reorder_questions(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(domain_id): Path<DomainId>,
    Json(req): Json<ReorderRequest<QuestionId>>,
) -> Result<Response, ApiError> {
    let result = state
        .edit_draft_handler()
        .handle(DraftEdit::ReorderQuestions {
            domain_id,
            order: req.order,
        })
        .await?;
    Ok(edit_response(result, StatusCode::OK))
}

/// PUT /admin/questions/:id
pub async fn update_question(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(question_id): Path<QuestionId>,
    Json(req): Json<QuestionRequest>,
) -> Result<Response, ApiError> {
    let fields = question_fields(req)?;
    let result = state
        .edit_draft_handler()
        .handle(DraftEdit::UpdateQuestion {
            question_id,
            fields,
        })
        .await?;
    Ok(edit_response(result, StatusCode::OK))
}

/// DELETE /admin/questions/:id
pub async fn delete_question(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(question_id): Path<QuestionId>,
) -> Result<Response, ApiError> {
    let result = state
        .edit_draft_handler()
        .handle(DraftEdit::DeleteQuestion { question_id })
        .await?;
    Ok(edit_response(result, StatusCode::OK))
}
