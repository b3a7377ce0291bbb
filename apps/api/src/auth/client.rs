//! Client for the hosted auth REST API (GoTrue-compatible).
//!
//! Accounts, passwords and sessions live entirely in the external service.
//! HireGen only forwards credentials and resolves bearer tokens to user ids.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The auth service refused the request (bad credentials, expired token, duplicate email).
    #[error("rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("auth service failure (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: AuthUser,
}

/// Result of a sign-up. `session` is absent when the service requires email confirmation.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// `/signup` returns a full session when auto-confirm is on, a bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

impl From<SignUpResponse> for SignUpOutcome {
    fn from(response: SignUpResponse) -> Self {
        match response {
            SignUpResponse::Session(session) => SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            },
            SignUpResponse::User(user) => SignUpOutcome {
                user,
                session: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// The service has used several error shapes over time.
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Session-based identity operations. Carried in `AppState` as `Arc<dyn AuthProvider>`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Resolves an access token to the user it belongs to.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;
}

#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AuthError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("content-type", "application/json")
    }

    async fn check(response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AuthErrorBody>(&body)
            .ok()
            .and_then(AuthErrorBody::into_message)
            .unwrap_or(body);

        if status.is_client_error() {
            Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(AuthError::Upstream {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl AuthProvider for AuthClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let response = self
            .request(self.client.post(self.url("signup")))
            .json(&Credentials { email, password })
            .send()
            .await?;
        let response = Self::check(response).await?;
        let parsed: SignUpResponse = response.json().await?;
        let outcome = SignUpOutcome::from(parsed);
        debug!(
            "Auth sign-up succeeded for user {} (session issued: {})",
            outcome.user.id,
            outcome.session.is_some()
        );
        Ok(outcome)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .request(self.client.post(self.url("token?grant_type=password")))
            .json(&Credentials { email, password })
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .request(self.client.post(self.url("logout")))
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .request(self.client.get(self.url("user")))
            .bearer_auth(access_token)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}
