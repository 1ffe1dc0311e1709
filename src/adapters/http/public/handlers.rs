//! HTTP handlers for the anonymous intake flow.
//!
//! The visitor's session handle travels in an `intake_<type_id>` cookie
//! scoped to the type's path; every step answers with JSON or a 303 to
//! the next step.

use std::collections::HashMap;

use axum::extract::{Json, Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};

use super::dto::{ContactRequest, DeliverResultRequest, StartIntakeParams};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::request::{client_ip, cookie};
use crate::adapters::http::state::AppState;
use crate::application::handlers::public::{
    CompleteIntakeCommand, DeliverResultCommand, FetchResultQuery, GetContactStepQuery,
    GetDomainStepQuery, StartIntakeCommand, SubmitDomainCommand,
};
use crate::domain::foundation::{DomainError, QuestionId, TypeId};
use crate::domain::public::{NextStep, SessionHandle};

fn cookie_name(type_id: TypeId) -> String {
    format!("intake_{}", type_id)
}

fn session_cookie(type_id: TypeId, handle: &SessionHandle) -> String {
    format!(
        "{}={}; Path=/public/{}; HttpOnly; SameSite=Lax",
        cookie_name(type_id),
        handle,
        type_id
    )
}

fn expired_cookie(type_id: TypeId) -> String {
    format!(
        "{}=; Path=/public/{}; HttpOnly; SameSite=Lax; Max-Age=0",
        cookie_name(type_id),
        type_id
    )
}

/// Reads the session handle; an unparseable cookie counts as absent.
fn session_handle(headers: &HeaderMap, type_id: TypeId) -> Option<SessionHandle> {
    cookie(headers, &cookie_name(type_id)).and_then(|v| v.parse().ok())
}

pub(crate) fn step_location(type_id: TypeId, step: NextStep) -> String {
    match step {
        NextStep::Domain(index) => format!("/public/{}/domain/{}", type_id, index),
        NextStep::Contact => format!("/public/{}/data", type_id),
    }
}

fn restart(type_id: TypeId) -> Response {
    Redirect::to(&format!("/public/{}", type_id)).into_response()
}

/// GET /public/:type_id - start or resume an intake
pub async fn start_intake(
    State(state): State<AppState>,
    Path(type_id): Path<TypeId>,
    Query(params): Query<StartIntakeParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let result = state
        .start_intake_handler()
        .handle(StartIntakeCommand {
            type_id,
            group: params.group,
            source_ip: client_ip(&headers),
            resume: session_handle(&headers, type_id),
        })
        .await?;

    tracing::debug!(
        type_id = %type_id,
        public_assessment_id = %result.session.public_assessment_id,
        resumed = result.resumed,
        "Intake session ready"
    );

    Ok((
        [(header::SET_COOKIE, session_cookie(type_id, &result.session.handle))],
        Redirect::to(&step_location(type_id, result.step)),
    )
        .into_response())
}

/// GET /public/:type_id/domain/:index - questions of one step
pub async fn get_domain_step(
    State(state): State<AppState>,
    Path((type_id, index)): Path<(TypeId, usize)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(handle) = session_handle(&headers, type_id) else {
        return Ok(restart(type_id));
    };
    let step = state
        .domain_step_handler()
        .handle(GetDomainStepQuery {
            type_id,
            handle,
            index,
        })
        .await?;
    Ok(Json(step).into_response())
}

/// POST /public/:type_id/domain/:index - submit `{question_id: value}`
pub async fn submit_domain_step(
    State(state): State<AppState>,
    Path((type_id, index)): Path<(TypeId, usize)>,
    headers: HeaderMap,
    Json(body): Json<HashMap<String, i32>>,
) -> Result<Response, ApiError> {
    let Some(handle) = session_handle(&headers, type_id) else {
        return Ok(restart(type_id));
    };

    let mut answers = body
        .into_iter()
        .map(|(key, value)| {
            key.trim()
                .parse::<QuestionId>()
                .map(|id| (id, value))
                .map_err(|_| {
                    DomainError::validation("question_id", format!("'{}' is not a question id", key))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    answers.sort_by_key(|(id, _)| *id);

    let next = state
        .submit_domain_handler()
        .handle(SubmitDomainCommand {
            type_id,
            handle,
            index,
            answers,
        })
        .await?;
    Ok(Redirect::to(&step_location(type_id, next)).into_response())
}

/// GET /public/:type_id/data - contact capture view
pub async fn get_contact_step(
    State(state): State<AppState>,
    Path(type_id): Path<TypeId>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(handle) = session_handle(&headers, type_id) else {
        return Ok(restart(type_id));
    };
    let step = state
        .contact_step_handler()
        .handle(GetContactStepQuery { type_id, handle })
        .await?;
    Ok(Json(step).into_response())
}

/// POST /public/:type_id/data - complete the intake
pub async fn submit_contact(
    State(state): State<AppState>,
    Path(type_id): Path<TypeId>,
    headers: HeaderMap,
    Json(req): Json<ContactRequest>,
) -> Result<Response, ApiError> {
    let Some(handle) = session_handle(&headers, type_id) else {
        return Ok(restart(type_id));
    };
    let result = state
        .complete_intake_handler()
        .handle(CompleteIntakeCommand {
            type_id,
            handle,
            contact: req.into(),
            ip: client_ip(&headers),
        })
        .await?;

    let location = format!(
        "/public/{}/result/{}",
        type_id,
        result.assessment.token().as_str()
    );
    Ok((
        [(header::SET_COOKIE, expired_cookie(type_id))],
        Redirect::to(&location),
    )
        .into_response())
}

/// GET /public/:type_id/result/:token - scored summary
pub async fn get_result(
    State(state): State<AppState>,
    Path((type_id, token)): Path<(TypeId, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .fetch_result_handler()
        .handle(FetchResultQuery {
            type_id: Some(type_id),
            token,
        })
        .await?;
    Ok(Json(summary))
}

/// POST /public/:type_id/result/:token/email - mail the result
pub async fn deliver_result(
    State(state): State<AppState>,
    Path((type_id, token)): Path<(TypeId, String)>,
    Json(req): Json<DeliverResultRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .deliver_result_handler()
        .handle(DeliverResultCommand {
            type_id: Some(type_id),
            token,
            email: req.email,
        })
        .await?;
    Ok(Json(summary))
}
