//! Bridge to the hosted auth provider.
//!
//! The server never stores credentials. It forwards signup and password
//! sign-in to the provider and asks the provider who a bearer token belongs
//! to on every authenticated request.

use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider refused the request; the message is safe to show.
    #[error("{0}")]
    Rejected(String),
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("auth provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected auth provider response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_user(&self, email: &str, password: &str, name: Option<&str>) -> Result<User, AuthError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn get_user(&self, access_token: &str) -> Result<User, AuthError>;
}

/// GoTrue REST client as exposed by a Supabase project.
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    service_role_key: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: impl Into<String>, service_role_key: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            service_role_key: service_role_key.into(),
            anon_key: anon_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
}

impl From<ProviderUser> for User {
    fn from(user: ProviderUser) -> Self {
        let name = user
            .user_metadata
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        User {
            id: user.id,
            email: user.email,
            name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: ProviderUser,
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn create_user(&self, email: &str, password: &str, name: Option<&str>) -> Result<User, AuthError> {
        let metadata = match name {
            Some(name) => json!({ "name": name }),
            None => json!({}),
        };
        let response = self
            .client
            .post(self.endpoint("admin/users"))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&json!({
                "email": email,
                "password": password,
                "user_metadata": metadata,
                "email_confirm": true,
            }))
            .send()
            .await?;

        let user: ProviderUser = read_json(response).await?;
        Ok(user.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self
            .client
            .post(self.endpoint("token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let token: TokenResponse = read_json(response).await?;
        Ok(Session {
            access_token: token.access_token,
            user: token.user.into(),
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AuthError::InvalidToken);
        }
        let user: ProviderUser = read_json(response).await?;
        Ok(user.into())
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, AuthError> {
    let status = response.status();
    let body: Value = response.json().await?;

    if status.is_client_error() {
        return Err(AuthError::Rejected(provider_message(&body)));
    }
    if !status.is_success() {
        return Err(AuthError::Unexpected(format!("{status}: {}", provider_message(&body))));
    }
    serde_json::from_value(body).map_err(|err| AuthError::Unexpected(err.to_string()))
}

/// GoTrue has used several field names for error text over time.
fn provider_message(body: &Value) -> String {
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .unwrap_or("request rejected")
        .to_string()
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

/// Extractor for routes that need a signed-in user.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(AppError::unauthorized());
        };

        match state.auth.get_user(token).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(AuthError::InvalidToken | AuthError::Rejected(_)) => {
                warn!("rejected bearer token");
                Err(AppError::unauthorized())
            }
            Err(err) => {
                error!("token verification failed: {err}");
                Err(AppError::unauthorized())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parses_scheme_case_insensitively() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("bearer  abc ")), Some("abc"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes_and_blanks() {
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn provider_user_reads_name_from_metadata() {
        let user: ProviderUser = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@example.com",
            "user_metadata": { "name": "Aki" }
        }))
        .unwrap();
        let user = User::from(user);
        assert_eq!(user.name.as_deref(), Some("Aki"));
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn provider_user_without_name_has_none() {
        let user: ProviderUser = serde_json::from_value(json!({
            "id": "u2",
            "email": "b@example.com",
            "user_metadata": {}
        }))
        .unwrap();
        assert!(User::from(user).name.is_none());
    }

    #[test]
    fn provider_message_prefers_known_fields() {
        assert_eq!(provider_message(&json!({ "msg": "User already registered" })), "User already registered");
        assert_eq!(provider_message(&json!({ "error_description": "bad" })), "bad");
        assert_eq!(provider_message(&json!({})), "request rejected");
    }
}
