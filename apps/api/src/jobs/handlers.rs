//! Axum route handlers for the job board.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::jobs::repo::{
    clean_requirements, find_job, insert_job, list_jobs, NewJob, DEFAULT_PAGE_SIZE,
};
use crate::models::job::{JobRow, JobType};
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobSearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl CreateJobRequest {
    fn into_new_job(self, employer_id: Uuid) -> Result<NewJob, AppError> {
        for (field, value) in [
            ("title", &self.title),
            ("company", &self.company),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} cannot be empty")));
            }
        }

        Ok(NewJob {
            title: self.title.trim().to_string(),
            company: self.company.trim().to_string(),
            location: self.location.trim().to_string(),
            salary: self.salary.trim().to_string(),
            job_type: self.job_type,
            description: self.description.trim().to_string(),
            requirements: clean_requirements(&self.requirements),
            employer_id: Some(employer_id),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DescribeJobRequest {
    pub title: String,
    #[serde(default)]
    pub company: String,
    /// Free text, e.g. "Python, Django, AWS, 5+ years exp".
    #[serde(default)]
    pub requirements: String,
}

#[derive(Debug, Serialize)]
pub struct DescribeJobResponse {
    pub description: String,
    pub ai_enabled: bool,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchQuery>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let jobs = list_jobs(
        &state.db,
        params.q.as_deref(),
        params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = find_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(job))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    user.require_role(&[Role::Employer, Role::Admin])?;

    let new_job = request.into_new_job(user.profile.id)?;
    let job = insert_job(&state.db, &new_job).await?;

    info!("User {} posted job {} ({})", user.profile.id, job.id, job.title);
    Ok((StatusCode::CREATED, Json(job)))
}

/// POST /api/v1/jobs/describe
///
/// Drafts a Markdown job description. Falls back to a placeholder without an AI key.
pub async fn handle_describe_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<DescribeJobRequest>,
) -> Result<Json<DescribeJobResponse>, AppError> {
    user.require_role(&[Role::Employer, Role::Admin])?;

    if request.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    let description = state
        .ai
        .generate_job_description(
            request.title.trim(),
            request.company.trim(),
            request.requirements.trim(),
        )
        .await;

    Ok(Json(DescribeJobResponse {
        description,
        ai_enabled: state.ai.is_enabled(),
    }))
}
