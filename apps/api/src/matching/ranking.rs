//! Candidate ranking: scores every applicant of a job and orders them best-first.
//!
//! Flow per candidate: cached score? → keep it. No resume text? → leave unscored.
//! Otherwise ask the scorer; failures degrade to a display-only fallback.
//! Scoring requests run concurrently (bounded) and are joined before sorting.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::matching::scorer::{CandidateAnalysis, MatchScorer};
use crate::models::application::ApplicationStatus;

/// One applicant to a job, with whatever score is already stored.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub application_id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(skip)]
    pub resume_text: Option<String>,
    pub analysis: Option<CandidateAnalysis>,
}

impl Candidate {
    fn score(&self) -> Option<u8> {
        self.analysis.as_ref().map(|a| a.score)
    }

    fn has_resume(&self) -> bool {
        self.resume_text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}

/// How a candidate's displayed score was obtained in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrigin {
    /// Score already stored on the application; not recomputed.
    Cached,
    /// Scored during this run.
    Fresh,
    /// No resume text to score.
    Unscored,
    /// Scorer call failed; fallback analysis shown.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub rank: usize, // 1-based
    #[serde(flatten)]
    pub candidate: Candidate,
    pub origin: ScoreOrigin,
    /// True when this run moved the application to a new status.
    pub status_changed: bool,
}

impl RankedCandidate {
    /// Fresh model scores are written back; simulated and fallback results are not.
    pub fn needs_persist(&self) -> bool {
        self.origin == ScoreOrigin::Fresh
            && self
                .candidate
                .analysis
                .as_ref()
                .map(CandidateAnalysis::is_cacheable)
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankingSummary {
    pub scored: usize,
    pub cached: usize,
    pub unscored: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingOutcome {
    pub candidates: Vec<RankedCandidate>,
    pub summary: RankingSummary,
}

#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
    pub concurrency: usize,
    /// Re-score candidates that already carry a stored score.
    pub force: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            force: false,
        }
    }
}

/// Scores every candidate that needs it, then ranks all of them.
pub async fn rank_candidates(
    scorer: &dyn MatchScorer,
    job_text: &str,
    candidates: Vec<Candidate>,
    options: RankOptions,
) -> RankingOutcome {
    let total = candidates.len();

    let evaluated: Vec<RankedCandidate> = stream::iter(candidates)
        .map(|candidate| evaluate(scorer, job_text, candidate, options.force))
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    let outcome = order(evaluated);
    info!(
        "Ranked {total} candidates with {} scorer: {} scored, {} cached, {} unscored, {} failed",
        scorer.backend(),
        outcome.summary.scored,
        outcome.summary.cached,
        outcome.summary.unscored,
        outcome.summary.failed
    );
    outcome
}

/// Ranks candidates by their stored scores only. Makes no scorer calls.
pub fn rank_stored(candidates: Vec<Candidate>) -> RankingOutcome {
    let evaluated = candidates
        .into_iter()
        .map(|candidate| {
            let origin = if candidate.analysis.is_some() {
                ScoreOrigin::Cached
            } else {
                ScoreOrigin::Unscored
            };
            unranked(candidate, origin, false)
        })
        .collect();
    order(evaluated)
}

async fn evaluate(
    scorer: &dyn MatchScorer,
    job_text: &str,
    mut candidate: Candidate,
    force: bool,
) -> RankedCandidate {
    if candidate.analysis.is_some() && (!force || !candidate.has_resume()) {
        return unranked(candidate, ScoreOrigin::Cached, false);
    }

    let resume_text = match candidate.resume_text.as_deref() {
        Some(text) if !text.trim().is_empty() => text,
        _ => return unranked(candidate, ScoreOrigin::Unscored, false),
    };

    let result = scorer.analyze(resume_text, job_text).await;
    match result {
        Ok(analysis) => {
            let advance =
                analysis.is_cacheable() && candidate.status == ApplicationStatus::Applied;
            if advance {
                candidate.status = ApplicationStatus::Screening;
            }
            candidate.analysis = Some(analysis);
            unranked(candidate, ScoreOrigin::Fresh, advance)
        }
        Err(e) => {
            warn!(
                "Scoring failed for application {}: {e}",
                candidate.application_id
            );
            candidate.analysis = Some(CandidateAnalysis::failed());
            unranked(candidate, ScoreOrigin::Failed, false)
        }
    }
}

fn unranked(candidate: Candidate, origin: ScoreOrigin, status_changed: bool) -> RankedCandidate {
    RankedCandidate {
        rank: 0,
        candidate,
        origin,
        status_changed,
    }
}

/// Best score first, unscored last; equal scores keep application order.
fn order(mut evaluated: Vec<RankedCandidate>) -> RankingOutcome {
    evaluated.sort_by(|a, b| b.candidate.score().cmp(&a.candidate.score()));

    let mut summary = RankingSummary::default();
    for (idx, ranked) in evaluated.iter_mut().enumerate() {
        ranked.rank = idx + 1;
        match ranked.origin {
            ScoreOrigin::Fresh => summary.scored += 1,
            ScoreOrigin::Cached => summary.cached += 1,
            ScoreOrigin::Unscored => summary.unscored += 1,
            ScoreOrigin::Failed => summary.failed += 1,
        }
    }

    RankingOutcome {
        candidates: evaluated,
        summary,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
