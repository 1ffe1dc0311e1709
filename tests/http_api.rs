//! HTTP surface tests driving the full router with `oneshot`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use secrecy::Secret;
use serde_json::{json, Value};
use tower::ServiceExt;

use maturity_assessment::adapters::audit::InMemoryAuditLog;
use maturity_assessment::adapters::auth::{sha256_hex, AdminAccount, InMemorySessionStore};
use maturity_assessment::adapters::http::{build_router, AppState, HttpSettings};
use maturity_assessment::adapters::notify::InMemoryNotifier;
use maturity_assessment::adapters::InMemoryStore;
use maturity_assessment::application::handlers::catalog::{
    ConfigureIntakeCommand, CreateTypeCommand, DraftEdit, DraftEditResult, PublishVersionCommand,
};
use maturity_assessment::domain::catalog::{DomainFields, QuestionFields};
use maturity_assessment::domain::foundation::{Principal, QuestionId, TypeId};

const ADMIN_LOGIN: &str = "admin@maturity.test";
const ADMIN_SECRET: &str = "open sesame";

fn state() -> AppState {
    let admin = AdminAccount {
        login: ADMIN_LOGIN.into(),
        display_name: "Admin".into(),
        secret_digest: Secret::new(sha256_hex(ADMIN_SECRET)),
    };
    AppState::new(
        InMemoryStore::new(),
        InMemorySessionStore::new(3600),
        Arc::new(InMemoryNotifier::new()),
        Arc::new(InMemoryAuditLog::new()),
        Some(admin),
    )
}

fn app(state: &AppState) -> Router {
    build_router(state.clone(), &HttpSettings::default())
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

fn answer_body(answers: &[(QuestionId, i32)]) -> String {
    let map: HashMap<String, i32> = answers
        .iter()
        .map(|(id, value)| (id.to_string(), *value))
        .collect();
    serde_json::to_string(&map).unwrap()
}

async fn login(state: &AppState) -> String {
    let response = app(state)
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "login": ADMIN_LOGIN, "secret": ADMIN_SECRET }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["token"].as_str().unwrap().to_string()
}

/// A published, publicly open type with one domain of `questions` light
/// questions.
async fn public_type(state: &AppState, questions: usize) -> (TypeId, Vec<QuestionId>) {
    let admin = Principal::admin(ADMIN_LOGIN, "Admin");
    let created = state
        .create_type_handler()
        .handle(CreateTypeCommand {
            name: "Security".into(),
            description: None,
            actor: admin.clone(),
        })
        .await
        .unwrap();
    let version_id = created.version.id();
    let type_id = created.assessment_type.id;

    let DraftEditResult::Domain(domain) = state
        .edit_draft_handler()
        .handle(DraftEdit::AddDomain {
            version_id,
            fields: DomainFields::new("Identity", None, true).unwrap(),
        })
        .await
        .unwrap()
    else {
        panic!("expected a domain");
    };
    let mut ids = Vec::new();
    for i in 0..questions {
        let fields =
            QuestionFields::new(&format!("Control {}", i), None, None, None, true, true).unwrap();
        if let DraftEditResult::Question(q) = state
            .edit_draft_handler()
            .handle(DraftEdit::AddQuestion {
                domain_id: domain.id,
                fields,
            })
            .await
            .unwrap()
        {
            ids.push(q.id);
        }
    }

    state
        .publish_version_handler()
        .handle(PublishVersionCommand {
            version_id,
            actor: admin.clone(),
        })
        .await
        .unwrap();
    state
        .configure_intake_handler()
        .handle(ConfigureIntakeCommand {
            type_id,
            enabled: true,
            recipients: String::new(),
            cta_text: None,
            actor: admin,
        })
        .await
        .unwrap();
    (type_id, ids)
}

#[tokio::test]
async fn health_reports_ok() {
    let state = state();
    let response = app(&state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let state = state();
    let response = app(&state)
        .oneshot(Request::get("/admin/types").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let state = state();
    let response = app(&state)
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "login": ADMIN_LOGIN, "secret": "guess" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_token_opens_the_catalog() {
    let state = state();
    let token = login(&state).await;

    let response = app(&state)
        .oneshot(
            Request::post("/admin/types")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "name": "Cloud" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["version"]["label"], "1.0");
}

#[tokio::test]
async fn unknown_lead_status_is_a_bad_request() {
    let state = state();
    let token = login(&state).await;

    let response = app(&state)
        .oneshot(
            Request::get("/admin/leads?status=dormant")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn step_without_cookie_restarts_intake() {
    let state = state();
    let (type_id, _) = public_type(&state, 1).await;

    let response = app(&state)
        .oneshot(
            Request::get(format!("/public/{}/domain/0", type_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/public/{}", type_id));
}

#[tokio::test]
async fn public_flow_redirects_through_to_result() {
    let state = state();
    let (type_id, questions) = public_type(&state, 2).await;

    // Start
    let response = app(&state)
        .oneshot(
            Request::get(format!("/public/{}?group=spring-fair", type_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/public/{}/domain/0", type_id));
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    // Answer the only domain
    let answers = answer_body(&[(questions[0], 5), (questions[1], 3)]);
    let response = app(&state)
        .oneshot(
            Request::post(format!("/public/{}/domain/0", type_id))
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(answers))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/public/{}/data", type_id));

    // Contact
    let response = app(&state)
        .oneshot(
            Request::post(format!("/public/{}/data", type_id))
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "name": "Dana", "email": "dana@acme.test" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let result_url = location(&response);
    assert!(result_url.starts_with(&format!("/public/{}/result/", type_id)));

    // Result: (5 + 3) / 10 = 80%
    let response = app(&state)
        .oneshot(Request::get(result_url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["overall"], 80.0);
    assert_eq!(body["responses"], 2);
}

#[tokio::test]
async fn invalid_answer_value_is_a_bad_request() {
    let state = state();
    let (type_id, questions) = public_type(&state, 1).await;

    let response = app(&state)
        .oneshot(
            Request::get(format!("/public/{}", type_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let response = app(&state)
        .oneshot(
            Request::post(format!("/public/{}/domain/0", type_id))
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(answer_body(&[(questions[0], 4)])))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
