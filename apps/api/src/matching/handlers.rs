//! Axum route handlers for candidate matching and ranking.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::jobs::ensure_can_manage;
use crate::jobs::repo::find_job;
use crate::matching::ranking::{
    rank_candidates, rank_stored, RankOptions, RankedCandidate, RankingSummary,
};
use crate::matching::repo::{load_candidates, persist_scores};
use crate::matching::scorer::CandidateAnalysis;
use crate::models::job::JobRow;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RankQuery {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub job_id: Uuid,
    pub scorer_backend: &'static str,
    pub candidates: Vec<RankedCandidate>,
    pub summary: RankingSummary,
    /// Applications whose score was written back in this run.
    pub persisted: usize,
}

#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    pub job_id: Uuid,
    pub candidates: Vec<RankedCandidate>,
    pub summary: RankingSummary,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub job_description: String,
}

async fn managed_job(state: &AppState, user: &CurrentUser, job_id: Uuid) -> Result<JobRow, AppError> {
    let job = find_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    ensure_can_manage(user, &job)?;
    Ok(job)
}

/// POST /api/v1/jobs/:id/rank?force=true
///
/// Scores unscored applicants, stores model scores, returns everyone best-first.
pub async fn handle_rank_candidates(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Query(query): Query<RankQuery>,
) -> Result<Json<RankResponse>, AppError> {
    let job = managed_job(&state, &user, job_id).await?;
    let candidates = load_candidates(&state.db, job_id).await?;

    let mut outcome = rank_candidates(
        state.scorer.as_ref(),
        &job.match_text(),
        candidates,
        RankOptions {
            concurrency: state.config.ranking_concurrency,
            force: query.force,
        },
    )
    .await;

    let persisted = persist_scores(&state.db, &mut outcome.candidates).await?;
    info!(
        "Job {job_id}: ranked {} candidates, persisted {persisted}",
        outcome.candidates.len()
    );

    Ok(Json(RankResponse {
        job_id,
        scorer_backend: state.scorer.backend(),
        candidates: outcome.candidates,
        summary: outcome.summary,
        persisted,
    }))
}

/// GET /api/v1/jobs/:id/candidates
///
/// Applicants ordered by their stored scores; no scoring happens here.
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
) -> Result<Json<CandidatesResponse>, AppError> {
    managed_job(&state, &user, job_id).await?;
    let outcome = rank_stored(load_candidates(&state.db, job_id).await?);

    Ok(Json(CandidatesResponse {
        job_id,
        candidates: outcome.candidates,
        summary: outcome.summary,
    }))
}

/// POST /api/v1/match/analyze
///
/// One-off score of free text against free text. Scorer failures come back as
/// the fallback analysis rather than an error.
pub async fn handle_analyze(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<CandidateAnalysis>, AppError> {
    let resume_text = request.resume_text.trim();
    let job_description = request.job_description.trim();
    if resume_text.is_empty() || job_description.is_empty() {
        return Err(AppError::Validation(
            "resume_text and job_description are required".to_string(),
        ));
    }

    let analysis = match state.scorer.analyze(resume_text, job_description).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Ad-hoc match analysis failed: {e}");
            CandidateAnalysis::failed()
        }
    };
    Ok(Json(analysis))
}
