use std::env;
use std::net::SocketAddr;

use chrono::{FixedOffset, TimeDelta};

use crate::error::AppError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://study_calendar.db?mode=rwc";
pub const DEFAULT_FIREBASE_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub admin: AdminCredentials,
    pub session_ttl: TimeDelta,
    pub session_sweep_secs: u64,
    pub utc_offset: FixedOffset,
    pub firebase: Option<FirebaseConfig>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which returns the raw value
    /// of a variable or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let username = lookup("ADMIN_USERNAME")
            .ok_or_else(|| AppError::Config("ADMIN_USERNAME is not set".to_string()))?;
        let password = lookup("ADMIN_PASSWORD")
            .ok_or_else(|| AppError::Config("ADMIN_PASSWORD is not set".to_string()))?;

        let ttl_hours = parse_number(&lookup, "SESSION_TTL_HOURS", 12)?;
        let session_ttl = i64::try_from(ttl_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .ok_or_else(|| AppError::Config("SESSION_TTL_HOURS is too large".to_string()))?;

        let session_sweep_secs = parse_number(&lookup, "SESSION_SWEEP_SECS", 300)?;
        if session_sweep_secs == 0 {
            return Err(AppError::Config(
                "SESSION_SWEEP_SECS must be at least 1".to_string(),
            ));
        }

        let utc_offset = lookup("STUDY_UTC_OFFSET")
            .unwrap_or_else(|| "+00:00".to_string())
            .parse::<FixedOffset>()
            .map_err(|e| AppError::Config(format!("STUDY_UTC_OFFSET is invalid: {}", e)))?;

        let firebase = lookup("FIREBASE_API_KEY").map(|api_key| FirebaseConfig {
            api_key,
            base_url: lookup("FIREBASE_AUTH_URL")
                .unwrap_or_else(|| DEFAULT_FIREBASE_AUTH_URL.to_string()),
        });

        Ok(Self {
            database_url,
            bind_addr,
            admin: AdminCredentials { username, password },
            session_ttl,
            session_sweep_secs,
            utc_offset,
            firebase,
        })
    }
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("{} is invalid: {}", key, e))),
        None => Ok(default),
    }
}
