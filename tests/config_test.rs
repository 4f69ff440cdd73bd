use std::collections::HashMap;

use chrono::TimeDelta;

use study_calendar::config::AppConfig;
use study_calendar::error::AppError;

fn load(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
    let mut env: HashMap<String, String> = HashMap::from([
        ("ADMIN_USERNAME".to_string(), "clinician".to_string()),
        ("ADMIN_PASSWORD".to_string(), "secret".to_string()),
    ]);
    for (key, value) in vars {
        env.insert(key.to_string(), value.to_string());
    }
    AppConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = load(&[]).expect("Failed to load config");
    assert_eq!(config.session_ttl, TimeDelta::hours(12));
    assert_eq!(config.session_sweep_secs, 300);
    assert_eq!(config.utc_offset.local_minus_utc(), 0);
    assert!(config.firebase.is_none());
}

#[test]
fn test_missing_admin_is_config_error() {
    let result = AppConfig::from_lookup(|_| None);
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn test_zero_sweep_interval_is_rejected() {
    let result = load(&[("SESSION_SWEEP_SECS", "0")]);
    assert!(matches!(result, Err(AppError::Config(_))));

    let config = load(&[("SESSION_SWEEP_SECS", "1")]).expect("Failed to load config");
    assert_eq!(config.session_sweep_secs, 1);
}

#[test]
fn test_oversized_session_ttl_is_rejected() {
    // i64 に収まらない値は負の TTL にならずエラーになる
    let result = load(&[("SESSION_TTL_HOURS", "18446744073709551615")]);
    assert!(matches!(result, Err(AppError::Config(_))));

    let result = load(&[("SESSION_TTL_HOURS", "9223372036854775807")]);
    assert!(matches!(result, Err(AppError::Config(_))));

    let config = load(&[("SESSION_TTL_HOURS", "24")]).expect("Failed to load config");
    assert_eq!(config.session_ttl, TimeDelta::hours(24));
}

#[test]
fn test_utc_offset_and_firebase() {
    let config = load(&[
        ("STUDY_UTC_OFFSET", "+09:00"),
        ("FIREBASE_API_KEY", "key"),
    ])
    .expect("Failed to load config");
    assert_eq!(config.utc_offset.local_minus_utc(), 9 * 3600);
    let firebase = config.firebase.expect("firebase configured");
    assert_eq!(firebase.api_key, "key");

    assert!(matches!(load(&[("STUDY_UTC_OFFSET", "tokyo")]), Err(AppError::Config(_))));
}
