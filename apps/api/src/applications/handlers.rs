//! Axum route handlers for job applications.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::applications::repo::{
    application_history, compute_stats, find_application, insert_application, update_status,
    ApplicationHistoryItem, ApplicationStats,
};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::jobs::ensure_can_manage;
use crate::jobs::repo::find_job;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::user::Role;
use crate::resumes::repo::find_resume;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ApplyRequest {
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub applications: Vec<ApplicationHistoryItem>,
    pub stats: ApplicationStats,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
}

/// POST /api/v1/jobs/:id/apply
///
/// One write per apply; a second apply to the same job is a 409.
pub async fn handle_apply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    body: Option<Json<ApplyRequest>>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    user.require_role(&[Role::Seeker])?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    find_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    if let Some(resume_id) = request.resume_id {
        let resume = find_resume(&state.db, resume_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
        if resume.user_id != user.profile.id {
            return Err(AppError::Forbidden);
        }
    }

    let application = insert_application(&state.db, job_id, user.profile.id, request.resume_id)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Already applied to job {job_id}")))?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications
pub async fn handle_history(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<HistoryResponse>, AppError> {
    let applications = application_history(&state.db, user.profile.id).await?;
    let stats = compute_stats(&applications);
    Ok(Json(HistoryResponse {
        applications,
        stats,
    }))
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(application_id): Path<Uuid>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = find_application(&state.db, application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;

    let job = find_job(&state.db, application.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", application.job_id)))?;
    ensure_can_manage(&user, &job)?;

    let current = application
        .status()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    if !current.can_transition_to(request.status) {
        return Err(AppError::UnprocessableEntity(format!(
            "cannot move application from {current} to {}",
            request.status
        )));
    }

    let updated = update_status(&state.db, application_id, current, request.status)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "Application {application_id} changed while updating; reload and retry"
            ))
        })?;

    info!(
        "Application {application_id}: {current} -> {} by {}",
        request.status, user.profile.id
    );
    Ok(Json(updated))
}
