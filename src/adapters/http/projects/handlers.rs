//! HTTP handlers for projects.
//!
//! Administrators manage projects and their members; respondents work
//! through question sheets of the projects they belong to. Estimates and
//! statistics serve both, with access checked by the application layer.

use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use super::dto::{
    AddRespondentRequest, CreateProjectRequest, ListProjectsParams, ProjectCreatedResponse,
    RecordResponseRequest, RecordResponseResponse, ReleaseResponse, UpdateProjectRequest,
};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{RequireAdmin, RequireAuth, RequireRespondent};
use crate::adapters::http::request::client_ip;
use crate::adapters::http::state::AppState;
use crate::application::handlers::project::{
    AddRespondentCommand, CreateProjectCommand, FinalizeAssessmentCommand, ProjectEstimateQuery,
    ProjectStatisticsQuery, QuestionSheetQuery, RecordResponseCommand, ReleaseProjectCommand,
    RemoveRespondentCommand, UpdateProjectCommand,
};
use crate::domain::foundation::{ProjectAssessmentId, ProjectId, QuestionId, RespondentId};

// ════════════════════════════════════════════════════════════════════════════════
// Administration
// ════════════════════════════════════════════════════════════════════════════════

/// GET /admin/projects[?client_id=]
pub async fn list_projects(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Query(params): Query<ListProjectsParams>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .project_queries()
            .list(&actor, params.client_id)
            .await?,
    ))
}

/// POST /admin/projects
pub async fn create_project(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_project_handler()
        .handle(CreateProjectCommand {
            client_id: req.client_id,
            name: req.name,
            description: req.description,
            evaluator_name: req.evaluator_name,
            evaluator_email: req.evaluator_email,
            version_ids: req.version_ids,
            actor,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectCreatedResponse {
            project: result.project,
            bindings: result.bindings,
        }),
    ))
}

/// PATCH /admin/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(project_id): Path<ProjectId>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project = state
        .update_project_handler()
        .handle(UpdateProjectCommand {
            project_id,
            deactivate: req.deactivate,
            report_text: req.report_text,
            actor,
        })
        .await?;
    Ok(Json(project))
}

/// GET /admin/projects/:id/respondents
pub async fn list_members(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.project_queries().members(&actor, project_id).await?,
    ))
}

/// POST /admin/projects/:id/respondents
pub async fn add_member(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(project_id): Path<ProjectId>,
    Json(req): Json<AddRespondentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = state
        .add_respondent_handler()
        .handle(AddRespondentCommand {
            project_id,
            respondent_id: req.respondent_id,
            actor,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// DELETE /admin/projects/:id/respondents/:respondent_id
pub async fn remove_member(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path((project_id, respondent_id)): Path<(ProjectId, RespondentId)>,
) -> Result<StatusCode, ApiError> {
    state
        .remove_respondent_handler()
        .handle(RemoveRespondentCommand {
            project_id,
            respondent_id,
            actor,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/projects/:id/release
pub async fn release_project(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .release_handler()
        .handle(ReleaseProjectCommand { project_id, actor })
        .await?;
    Ok(Json(ReleaseResponse {
        project: result.project,
        changed: result.changed,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Shared views
// ════════════════════════════════════════════════════════════════════════════════

/// GET /admin/projects/:id, GET /respondent/projects/:id - progress estimate
pub async fn get_estimate(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
    let estimate = state
        .estimate_handler()
        .handle(ProjectEstimateQuery { project_id, actor })
        .await?;
    Ok(Json(estimate))
}

/// GET /admin/projects/:id/statistics, GET /respondent/projects/:id/statistics
pub async fn get_statistics(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(project_id): Path<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
    let statistics = state
        .project_statistics_handler()
        .handle(ProjectStatisticsQuery { project_id, actor })
        .await?;
    Ok(Json(statistics))
}

// ════════════════════════════════════════════════════════════════════════════════
// Respondent workspace
// ════════════════════════════════════════════════════════════════════════════════

/// GET /respondent/projects - active projects the caller belongs to
pub async fn my_projects(
    State(state): State<AppState>,
    RequireRespondent(actor): RequireRespondent,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.project_queries().list(&actor, None).await?))
}

/// GET /respondent/assessments/:binding_id - question sheet
pub async fn get_question_sheet(
    State(state): State<AppState>,
    RequireRespondent(actor): RequireRespondent,
    Path(binding_id): Path<ProjectAssessmentId>,
) -> Result<impl IntoResponse, ApiError> {
    let sheet = state
        .question_sheet_handler()
        .handle(QuestionSheetQuery { binding_id, actor })
        .await?;
    Ok(Json(sheet))
}

/// PUT /respondent/assessments/:binding_id/responses/:question_id
pub async fn record_response(
    State(state): State<AppState>,
    RequireRespondent(actor): RequireRespondent,
    Path((binding_id, question_id)): Path<(ProjectAssessmentId, QuestionId)>,
    headers: HeaderMap,
    Json(req): Json<RecordResponseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .record_response_handler()
        .handle(RecordResponseCommand {
            binding_id,
            question_id,
            score: req.score,
            comment: req.comment,
            actor,
            ip: client_ip(&headers),
        })
        .await?;
    Ok(Json(RecordResponseResponse::new(
        result.outcome,
        result.progress,
    )))
}

/// POST /respondent/assessments/:binding_id/finalize
pub async fn finalize_assessment(
    State(state): State<AppState>,
    RequireRespondent(actor): RequireRespondent,
    Path(binding_id): Path<ProjectAssessmentId>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let binding = state
        .finalize_handler()
        .handle(FinalizeAssessmentCommand {
            binding_id,
            actor,
            ip: client_ip(&headers),
        })
        .await?;
    Ok(Json(binding))
}
