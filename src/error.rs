use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Malformed document: {0}")]
    Document(#[from] serde_json::Error),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid credential format: {0}")]
    InvalidCredentialFormat(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Stable identifier clients can switch on.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Migration(_) => "database",
            AppError::Document(_) => "malformed_document",
            AppError::Schedule(ScheduleError::InvalidInput(_)) => "invalid_input",
            AppError::Schedule(ScheduleError::InvalidRange { .. }) => "invalid_range",
            AppError::NotFound(_) => "not_found",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::InvalidCredentialFormat(_) => "invalid_credential_format",
            AppError::Unauthorized => "unauthorized",
            AppError::Identity(_) => "identity_provider",
            AppError::Config(_) => "config",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::Schedule(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidCredentialFormat(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing, invalid or expired session".to_string(),
            ),
            AppError::Identity(msg) => {
                error!("identity provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Identity provider request failed".to_string())
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Migration(e) => {
                error!("migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Document(e) => {
                error!("stored document could not be decoded: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Stored document is malformed".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            code: code.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
