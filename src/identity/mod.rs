pub mod dto;

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::FirebaseConfig;
use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// An account created by an [`IdentityProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub uid: String,
    pub email: String,
    /// Token that authorizes deleting the account again, when the provider
    /// issues one.
    pub id_token: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn user_exists(&self, email: &str) -> Result<bool, AppError>;
    async fn create_user(&self, email: &str, password: &str) -> Result<IdentityUser, AppError>;
    async fn delete_user(&self, user: &IdentityUser) -> Result<(), AppError>;
}

/// Rejects credentials every provider would refuse.
pub fn check_credential_format(email: &str, password: &str) -> Result<(), AppError> {
    let email_ok = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !email_ok || email.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidCredentialFormat(format!("invalid email address: {}", email)));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidCredentialFormat(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Firebase Authentication through the Identity Toolkit REST API.
pub struct FirebaseIdentityClient {
    client: Client,
    config: FirebaseConfig,
}

impl FirebaseIdentityClient {
    pub fn new(config: FirebaseConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.config.base_url.trim_end_matches('/'),
            method,
            self.config.api_key
        )
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, AppError>
    where
        B: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("accounts:{} request failed: {}", method, e)))?;

        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(map_firebase_error(method, status.as_u16(), &body_text));
        }

        serde_json::from_str::<R>(&body_text).map_err(|e| {
            AppError::Identity(format!("Failed to parse accounts:{} response: {}", method, e))
        })
    }
}

fn map_firebase_error(method: &str, status: u16, body: &str) -> AppError {
    let message = serde_json::from_str::<dto::ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string());

    match message.split([' ', ':']).next().unwrap_or_default() {
        "EMAIL_EXISTS" => AppError::AlreadyExists("User already exists".to_string()),
        "INVALID_EMAIL" | "MISSING_EMAIL" | "WEAK_PASSWORD" | "MISSING_PASSWORD"
        | "INVALID_PASSWORD" => AppError::InvalidCredentialFormat(message),
        _ => AppError::Identity(format!("accounts:{} returned {}: {}", method, status, message)),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityClient {
    async fn user_exists(&self, email: &str) -> Result<bool, AppError> {
        let request = dto::CreateAuthUriRequest {
            identifier: email,
            continue_uri: "http://localhost",
        };
        let response: dto::CreateAuthUriResponse = self.call("createAuthUri", &request).await?;
        Ok(response.registered)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<IdentityUser, AppError> {
        check_credential_format(email, password)?;
        let request = dto::SignUpRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response: dto::SignUpResponse = self.call("signUp", &request).await?;
        info!("created firebase account {}", response.local_id);

        Ok(IdentityUser {
            uid: response.local_id,
            email: email.to_string(),
            id_token: response.id_token,
        })
    }

    async fn delete_user(&self, user: &IdentityUser) -> Result<(), AppError> {
        let Some(id_token) = user.id_token.as_deref() else {
            warn!("cannot delete firebase account {} without an id token", user.uid);
            return Err(AppError::Identity(format!(
                "no id token to delete account {}",
                user.uid
            )));
        };
        let request = dto::DeleteAccountRequest { id_token };
        let _: serde_json::Value = self.call("delete", &request).await?;
        info!("deleted firebase account {}", user.uid);
        Ok(())
    }
}

/// Process-local accounts for development and tests. Passwords are checked
/// for format and then discarded.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    users: RwLock<HashMap<String, String>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn uid_of(&self, email: &str) -> Option<String> {
        self.users.read().await.get(&email.to_lowercase()).cloned()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn user_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users.read().await.contains_key(&email.to_lowercase()))
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<IdentityUser, AppError> {
        check_credential_format(email, password)?;
        let mut users = self.users.write().await;
        let key = email.to_lowercase();
        if users.contains_key(&key) {
            return Err(AppError::AlreadyExists("User already exists".to_string()));
        }
        let uid = Uuid::new_v4().simple().to_string();
        users.insert(key, uid.clone());

        Ok(IdentityUser {
            uid,
            email: email.to_string(),
            id_token: None,
        })
    }

    async fn delete_user(&self, user: &IdentityUser) -> Result<(), AppError> {
        self.users.write().await.remove(&user.email.to_lowercase());
        Ok(())
    }
}
