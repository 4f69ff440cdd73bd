use axum::Json;
use axum::extract::{FromRequestParts, Query};
use axum::http::{HeaderMap, header, request::Parts};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::*;
use crate::services::{CalendarService, EnrollmentService, Session};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/participants", post(enroll_participant))
        .route("/participants/calendar", get(get_calendar))
        .route("/participants/modify", post(modify_participant))
        .with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim()
        .parse()
        .ok()
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        state.sessions.validate(&token).await
    }
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>
) -> Result<Json<LoginResponse>, AppError> {
    let session = state.sessions.login(&state.admin, &req.username, &req.password).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
    }))
}

async fn logout(State(state): State<AppState>, session: Session) -> StatusCode {
    state.sessions.revoke(&session.token).await;
    StatusCode::NO_CONTENT
}

async fn enroll_participant(
    State(state): State<AppState>,
    _session: Session,
    Json(req): Json<EnrollRequest>
) -> Result<(StatusCode, Json<EnrollmentResponse>), AppError> {
    let service = EnrollmentService::new(state.db.clone(), state.identity.clone(), state.generator);
    let enrolled = service.enroll(req).await?;
    Ok((StatusCode::CREATED, Json(enrolled)))
}

async fn get_calendar(
    State(state): State<AppState>,
    _session: Session,
    Query(params): Query<CalendarQuery>
) -> Result<Json<Calendar>, AppError> {
    let service = CalendarService::new(state.db.clone(), state.generator);
    let calendar = service.fetch_calendar(params.email.trim()).await?;
    Ok(Json(calendar))
}

async fn modify_participant(
    State(state): State<AppState>,
    _session: Session,
    Json(req): Json<ModifyRequest>
) -> Result<Json<ModifyResponse>, AppError> {
    let service = CalendarService::new(state.db.clone(), state.generator);
    let outcome = service.modify(req).await?;
    Ok(Json(outcome))
}
