use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{FixedOffset, TimeDelta};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use study_calendar::api::router;
use study_calendar::config::AdminCredentials;
use study_calendar::db;
use study_calendar::identity::{IdentityProvider, InMemoryIdentityProvider};
use study_calendar::schedule::ScheduleGenerator;
use study_calendar::services::SessionStore;
use study_calendar::state::AppState;

const ADMIN: &str = "clinician";
const ADMIN_PASSWORD: &str = "correct horse";

async fn test_state(session_ttl: TimeDelta) -> (AppState, Arc<InMemoryIdentityProvider>) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    db::migrate(&pool).await.expect("Failed to run migrations");

    let identity = Arc::new(InMemoryIdentityProvider::new());
    let state = AppState {
        db: pool,
        identity: identity.clone(),
        sessions: SessionStore::new(session_ttl),
        admin: Arc::new(AdminCredentials {
            username: ADMIN.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        }),
        generator: ScheduleGenerator::new(FixedOffset::east_opt(0).expect("valid offset")),
    };
    (state, identity)
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is JSON")
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": ADMIN, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token").to_string()
}

fn enrollment(email: &str) -> Value {
    json!({
        "email": email,
        "password": "Cough999!",
        "sex": "Female",
        "start_date": "2024-01-01",
        "time_frame_months": 1,
        "questionnaire": {
            "time": "18:30:00",
            "link": "https://example.com/q"
        }
    })
}

#[tokio::test]
async fn test_health() {
    let (state, _) = test_state(TimeDelta::hours(12)).await;
    let app = router(state);

    let (status, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let (state, _) = test_state(TimeDelta::hours(12)).await;
    let app = router(state);

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": ADMIN, "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_participant_routes_require_session() {
    let (state, _) = test_state(TimeDelta::hours(12)).await;
    let app = router(state);

    let (status, _) = send(&app, "POST", "/participants", None, Some(enrollment("p@example.com"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/participants",
        Some("not-a-token"),
        Some(enrollment("p@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let (state, _) = test_state(TimeDelta::zero()).await;
    let sessions = state.sessions.clone();
    let app = router(state);
    let token = login(&app).await;

    let (status, _) = send(&app, "POST", "/participants", Some(&token), Some(enrollment("p@example.com"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(sessions.is_empty().await);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (state, _) = test_state(TimeDelta::hours(12)).await;
    let app = router(state);
    let token = login(&app).await;

    let (status, _) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_enroll_generates_and_stores_calendar() {
    let (state, identity) = test_state(TimeDelta::hours(12)).await;
    let app = router(state);
    let token = login(&app).await;

    let (status, body) = send(&app, "POST", "/participants", Some(&token), Some(enrollment("p1@example.com"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["calendar_days"], 28);
    assert_eq!(body["first_date"], "2024-01-01");
    assert_eq!(body["last_date"], "2024-01-28");
    assert_eq!(body["questionnaire_days"], 2);
    assert_eq!(
        identity.uid_of("p1@example.com").await.as_deref(),
        body["uid"].as_str()
    );

    let (status, calendar) = send(
        &app,
        "GET",
        "/participants/calendar?email=p1@example.com",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let days = calendar.as_object().expect("calendar is an object");
    assert_eq!(days.len(), 28);

    let jan1 = &calendar["2024-01-01"];
    for task in ["Hailie", "RespiTrak", "Cough Monitor", "CheckIn", "Questionnaire"] {
        assert_eq!(jan1[task]["Completed"], false, "{} on 2024-01-01", task);
    }
    assert_eq!(jan1["Questionnaire"]["Link"], "https://example.com/q");
    assert!(calendar["2024-01-02"].get("Questionnaire").is_none());
    assert!(calendar["2024-01-15"].get("Questionnaire").is_some());
}

#[tokio::test]
async fn test_duplicate_enrollment_is_conflict() {
    let (state, _) = test_state(TimeDelta::hours(12)).await;
    let app = router(state);
    let token = login(&app).await;

    let (status, _) = send(&app, "POST", "/participants", Some(&token), Some(enrollment("dup@example.com"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/participants", Some(&token), Some(enrollment("DUP@example.com"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "already_exists");
}

#[tokio::test]
async fn test_enroll_rejects_bad_credentials_and_time_frame() {
    let (state, identity) = test_state(TimeDelta::hours(12)).await;
    let app = router(state);
    let token = login(&app).await;

    let mut weak = enrollment("weak@example.com");
    weak["password"] = json!("abc");
    let (status, body) = send(&app, "POST", "/participants", Some(&token), Some(weak)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_credential_format");

    let mut too_long = enrollment("long@example.com");
    too_long["time_frame_months"] = json!(13);
    let (status, body) = send(&app, "POST", "/participants", Some(&token), Some(too_long)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "invalid_input");

    assert!(!identity.user_exists("weak@example.com").await.expect("lookup"));
    assert!(!identity.user_exists("long@example.com").await.expect("lookup"));
}

#[tokio::test]
async fn test_modify_removes_then_extends() {
    let (state, _) = test_state(TimeDelta::hours(12)).await;
    let app = router(state);
    let token = login(&app).await;
    send(&app, "POST", "/participants", Some(&token), Some(enrollment("p2@example.com"))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/participants/modify",
        Some(&token),
        Some(json!({
            "email": "p2@example.com",
            "remove": { "start": "2024-01-02", "end": "2024-01-03" },
            "extend": {
                "start": "2024-01-29",
                "end": "2024-01-30",
                "questionnaire_link": "https://example.com/q2"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed_days"], 2);
    assert_eq!(body["extended_days"], 2);
    assert_eq!(body["calendar_days"], 28);

    let (_, calendar) = send(
        &app,
        "GET",
        "/participants/calendar?email=p2@example.com",
        Some(&token),
        None,
    )
    .await;
    assert!(calendar.get("2024-01-02").is_none());
    assert!(calendar.get("2024-01-03").is_none());
    assert_eq!(calendar["2024-01-29"]["Questionnaire"]["Link"], "https://example.com/q2");
    assert!(calendar["2024-01-30"].get("Questionnaire").is_none());
    assert_eq!(calendar["2024-01-30"]["Hailie"]["Completed"], false);
    assert!(calendar["2024-01-30"]["Hailie"]["Due time"].is_string());
    assert_eq!(calendar["2024-01-01"]["Questionnaire"]["Link"], "https://example.com/q");
}

#[tokio::test]
async fn test_modify_errors_are_distinguishable() {
    let (state, _) = test_state(TimeDelta::hours(12)).await;
    let app = router(state);
    let token = login(&app).await;
    send(&app, "POST", "/participants", Some(&token), Some(enrollment("p3@example.com"))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/participants/modify",
        Some(&token),
        Some(json!({
            "email": "ghost@example.com",
            "extend": { "start": "2024-02-01", "end": "2024-02-02" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, body) = send(
        &app,
        "POST",
        "/participants/modify",
        Some(&token),
        Some(json!({
            "email": "p3@example.com",
            "remove": { "start": "2024-01-05", "end": "2024-01-04" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "invalid_range");

    let (status, body) = send(
        &app,
        "POST",
        "/participants/modify",
        Some(&token),
        Some(json!({ "email": "p3@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "invalid_input");

    // 存在しない日付の削除はエラーにならない
    let (status, body) = send(
        &app,
        "POST",
        "/participants/modify",
        Some(&token),
        Some(json!({
            "email": "p3@example.com",
            "remove": { "start": "2099-01-01", "end": "2099-01-02" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed_days"], 0);
    assert_eq!(body["calendar_days"], 28);
}
