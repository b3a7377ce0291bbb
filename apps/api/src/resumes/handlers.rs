//! Axum route handlers for the resume builder.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::ai::ResumeInsights;
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::repo::{insert_resume, list_resumes, NewResume};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub experience: String,
    #[serde(default)]
    pub skills: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub ai_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub experience: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub target_role: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveResumeRequest {
    pub target_role: String,
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// The rough work history the resume was generated from.
    #[serde(default)]
    pub experience: String,
}

/// Resume text handed to the optimizer.
fn draft_text(experience: &str, skills: &str) -> String {
    format!("Experience: {}. Skills: {}", experience.trim(), skills.trim())
}

fn resume_title(target_role: &str) -> String {
    let role = target_role.trim();
    if role.is_empty() {
        "My Resume".to_string()
    } else {
        format!("{role} Resume")
    }
}

fn require_experience(experience: &str) -> Result<(), AppError> {
    if experience.trim().is_empty() {
        return Err(AppError::Validation("experience cannot be empty".to_string()));
    }
    Ok(())
}

/// POST /api/v1/resumes/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    require_experience(&request.experience)?;

    let summary = state
        .ai
        .generate_resume_summary(request.experience.trim(), request.skills.trim())
        .await;

    Ok(Json(SummaryResponse {
        summary,
        ai_enabled: state.ai.is_enabled(),
    }))
}

/// POST /api/v1/resumes/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<ResumeInsights>, AppError> {
    require_experience(&request.experience)?;

    let insights = state
        .ai
        .optimize_resume(
            &draft_text(&request.experience, &request.skills),
            request.target_role.trim(),
        )
        .await;

    Ok(Json(insights))
}

/// POST /api/v1/resumes
pub async fn handle_save_resume(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SaveResumeRequest>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    if request.summary.trim().is_empty() {
        return Err(AppError::Validation("summary cannot be empty".to_string()));
    }

    let title = resume_title(&request.target_role);
    let skills: Vec<String> = request
        .skills
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let resume = insert_resume(
        &state.db,
        NewResume {
            user_id: user.profile.id,
            title: &title,
            summary: request.summary.trim(),
            skills: &skills,
            raw_text: request.experience.trim(),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    Ok(Json(list_resumes(&state.db, user.profile.id).await?))
}
