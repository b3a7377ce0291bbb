//! Axum route handlers for sign-up, sign-in, sign-out and session lookup.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::client::AuthSession;
use crate::auth::extractor::CurrentUser;
use crate::auth::profiles::{
    avatar_url, find_profile, find_profile_by_email, insert_profile, NewProfile,
};
use crate::errors::AppError;
use crate::models::user::{Role, UserProfile};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub profile: UserProfile,
}

impl SessionResponse {
    fn new(session: AuthSession, profile: UserProfile) -> Self {
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
            profile,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub profile: UserProfile,
    /// Absent when the auth service requires email confirmation first.
    pub session: Option<SessionResponse>,
}

fn validate_sign_up(req: &SignUpRequest) -> Result<(), AppError> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("a valid email is required".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name cannot be empty".to_string()));
    }
    if !req.role.is_self_assignable() {
        return Err(AppError::Validation(format!(
            "role {} cannot be chosen at sign-up",
            req.role
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/auth/signup
///
/// Creates the auth account first, then the public profile row keyed by the auth user id.
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), AppError> {
    validate_sign_up(&req)?;

    let email = req.email.trim();
    let full_name = req.full_name.trim();

    // Checked before the auth account exists so a duplicate leaves nothing behind.
    if find_profile_by_email(&state.db, email).await?.is_some() {
        return Err(AppError::Conflict(format!("An account for {email} already exists")));
    }

    let outcome = state.auth.sign_up(email, &req.password).await?;
    let avatar = avatar_url(full_name);

    let profile = insert_profile(
        &state.db,
        NewProfile {
            id: outcome.user.id,
            email,
            full_name,
            role: req.role,
            avatar_url: avatar.as_deref(),
        },
    )
    .await?;

    let session = outcome
        .session
        .map(|session| SessionResponse::new(session, profile.clone()));

    Ok((StatusCode::CREATED, Json(SignUpResponse { profile, session })))
}

/// POST /api/v1/auth/signin
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let session = state.auth.sign_in(req.email.trim(), &req.password).await?;

    let profile = find_profile(&state.db, session.user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {} not found", session.user.id)))?;

    info!("User {} signed in as {}", profile.id, profile.role);
    Ok(Json(SessionResponse::new(session, profile)))
}

/// POST /api/v1/auth/signout
pub async fn handle_sign_out(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<StatusCode, AppError> {
    state.auth.sign_out(&user.access_token).await?;
    info!("User {} signed out", user.profile.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
pub async fn handle_session(user: CurrentUser) -> Json<UserProfile> {
    Json(user.profile)
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = find_profile(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))?;
    Ok(Json(profile))
}
