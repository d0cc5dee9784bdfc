//! # Integration Tests for tkt-api
//!
//! Drives the full router over the in-memory store: ticket creation and its
//! rejection codes, listing with embedded relations, request validation,
//! fixtures bootstrap, health checks, and the OpenAPI document.

use std::io::Write;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tkt_api::config::AppConfig;
use tkt_api::state::AppState;
use tkt_core::{Company, CompanyId, User, UserId, UserRole};
use tkt_engine::{EngineConfig, InMemoryStore};

const ACME: i64 = 1;

/// Helper: a store with one company and the given `(id, role)` users,
/// each created a minute after the previous one.
async fn seeded_store(users: &[(i64, UserRole)]) -> InMemoryStore {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let store = InMemoryStore::new();
    store
        .insert_company(Company {
            id: CompanyId::new(ACME),
            name: "Acme Ltd".into(),
            created_at: base,
        })
        .await;
    for (minute, (id, role)) in users.iter().enumerate() {
        store
            .insert_user(User {
                id: UserId::new(*id),
                name: format!("user-{id}"),
                role: *role,
                company_id: CompanyId::new(ACME),
                created_at: base + Duration::minutes(minute as i64),
            })
            .await;
    }
    store
}

/// Helper: build the test app over a seeded store.
async fn test_app(users: &[(i64, UserRole)]) -> axum::Router {
    let store = seeded_store(users).await;
    tkt_api::app(AppState::in_memory(store, EngineConfig::default()))
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn create_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/tickets")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// -- Health Checks ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_check() {
    let app = test_app(&[]).await;
    let response = app.oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_check() {
    let app = test_app(&[]).await;
    let response = app.oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Ticket Creation ----------------------------------------------------------

#[tokio::test]
async fn test_create_management_report_assigns_newest_accountant() {
    let app = test_app(&[(10, UserRole::Accountant), (11, UserRole::Accountant)]).await;
    let response = app
        .oneshot(create_request(
            json!({ "type": "managementReport", "companyId": ACME }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["type"], "managementReport");
    assert_eq!(body["category"], "accounting");
    assert_eq!(body["companyId"], ACME);
    assert_eq!(body["assigneeId"], 11);
    assert_eq!(body["status"], "open");
}

#[tokio::test]
async fn test_unknown_type_is_bad_request() {
    let app = test_app(&[(10, UserRole::Accountant)]).await;
    let response = app
        .oneshot(create_request(json!({ "type": "audit", "companyId": ACME })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_TICKET_TYPE");
    assert_eq!(body["error"]["details"]["value"], "audit");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("managementReport, registrationAddressChange, strikeOff"));
}

#[tokio::test]
async fn test_second_open_registration_change_conflicts() {
    let app = test_app(&[(20, UserRole::CorporateSecretary)]).await;
    let request = json!({ "type": "registrationAddressChange", "companyId": ACME });

    let first = app
        .clone()
        .oneshot(create_request(request.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(body_json(first).await["category"], "corporate");

    let second = app.oneshot(create_request(request)).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["error"]["code"], "CONFLICTING_OPEN_TICKET");
    assert_eq!(body["error"]["details"]["companyId"], ACME);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("registration address change"));
}

#[tokio::test]
async fn test_two_directors_make_strike_off_ambiguous() {
    let app = test_app(&[(30, UserRole::Director), (31, UserRole::Director)]).await;
    let response = app
        .oneshot(create_request(json!({ "type": "strikeOff", "companyId": ACME })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "AMBIGUOUS_ASSIGNEE");
    assert_eq!(body["error"]["details"]["role"], "director");
    assert_eq!(body["error"]["details"]["count"], 2);
}

#[tokio::test]
async fn test_missing_assignee_is_conflict() {
    let app = test_app(&[(30, UserRole::Director)]).await;
    let response = app
        .oneshot(create_request(
            json!({ "type": "managementReport", "companyId": ACME }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NO_ELIGIBLE_ASSIGNEE");
    assert_eq!(body["error"]["details"]["roles"], json!(["accountant"]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app(&[]).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/tickets")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_missing_company_id_is_bad_request() {
    let app = test_app(&[]).await;
    let response = app
        .oneshot(create_request(json!({ "type": "strikeOff" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_positive_company_id_is_validation_error() {
    let app = test_app(&[]).await;
    let response = app
        .oneshot(create_request(json!({ "type": "strikeOff", "companyId": 0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

// -- Listing ------------------------------------------------------------------

#[tokio::test]
async fn test_list_embeds_company_and_assignee_after_strike_off() {
    let app = test_app(&[(10, UserRole::Accountant), (30, UserRole::Director)]).await;

    let report = app
        .clone()
        .oneshot(create_request(
            json!({ "type": "managementReport", "companyId": ACME }),
        ))
        .await
        .unwrap();
    assert_eq!(report.status(), StatusCode::CREATED);

    let strike_off = app
        .clone()
        .oneshot(create_request(json!({ "type": "strikeOff", "companyId": ACME })))
        .await
        .unwrap();
    assert_eq!(strike_off.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/api/v1/tickets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let tickets = body.as_array().unwrap();
    assert_eq!(tickets.len(), 2);

    assert_eq!(tickets[0]["type"], "managementReport");
    assert_eq!(tickets[0]["status"], "resolved");
    assert_eq!(tickets[0]["assignee"]["id"], 10);
    assert_eq!(tickets[0]["assignee"]["role"], "accountant");

    assert_eq!(tickets[1]["type"], "strikeOff");
    assert_eq!(tickets[1]["status"], "open");
    assert_eq!(tickets[1]["category"], "management");
    assert_eq!(tickets[1]["company"]["name"], "Acme Ltd");
    assert_eq!(tickets[1]["assignee"]["id"], 30);
}

#[tokio::test]
async fn test_list_is_empty_for_fresh_store() {
    let app = tkt_api::app(AppState::new());
    let response = app.oneshot(get("/api/v1/tickets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

// -- Bootstrap ----------------------------------------------------------------

#[tokio::test]
async fn test_state_from_fixtures_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let fixtures = json!({
        "companies": [
            { "id": 7, "name": "Globex plc", "createdAt": "2024-01-01T00:00:00Z" }
        ],
        "users": [
            {
                "id": 70,
                "name": "Grace",
                "role": "corporateSecretary",
                "companyId": 7,
                "createdAt": "2024-01-02T00:00:00Z"
            }
        ]
    });
    file.write_all(fixtures.to_string().as_bytes()).unwrap();

    let config = AppConfig {
        fixtures: Some(file.path().to_path_buf()),
        ..AppConfig::default()
    };
    let state = AppState::from_config(&config).await.unwrap();
    assert_eq!(state.tickets.backend(), "memory");

    let response = tkt_api::app(state)
        .oneshot(create_request(
            json!({ "type": "registrationAddressChange", "companyId": 7 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["assigneeId"], 70);
}

#[tokio::test]
async fn test_unreadable_fixtures_fail_startup() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[]").unwrap();

    let config = AppConfig {
        fixtures: Some(file.path().to_path_buf()),
        ..AppConfig::default()
    };
    assert!(AppState::from_config(&config).await.is_err());
}

#[tokio::test]
async fn test_fixture_ticket_with_mismatched_category_fails_startup() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let fixtures = json!({
        "tickets": [
            {
                "id": 1,
                "type": "strikeOff",
                "category": "accounting",
                "companyId": 7,
                "assigneeId": 70,
                "status": "open",
                "createdAt": "2024-03-01T09:00:00Z",
                "updatedAt": "2024-03-01T09:00:00Z"
            }
        ]
    });
    file.write_all(fixtures.to_string().as_bytes()).unwrap();

    let config = AppConfig {
        fixtures: Some(file.path().to_path_buf()),
        ..AppConfig::default()
    };
    let err = AppState::from_config(&config).await.unwrap_err();
    assert!(format!("{err:#}").contains("does not belong to type"));
}

// -- OpenAPI & Metrics ----------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_served() {
    let app = test_app(&[]).await;
    let response = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/api/v1/tickets"]["post"].is_object());
    assert!(body["paths"]["/api/v1/tickets"]["get"].is_object());
}

#[tokio::test]
async fn test_metrics_not_found_without_recorder() {
    let app = test_app(&[]).await;
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
