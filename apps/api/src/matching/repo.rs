use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::matching::ranking::{Candidate, RankedCandidate};
use crate::matching::scorer::{AnalysisSource, CandidateAnalysis};
use crate::models::application::ApplicationStatus;

#[derive(Debug, FromRow)]
struct CandidateRow {
    application_id: Uuid,
    user_id: Uuid,
    full_name: String,
    email: String,
    status: String,
    applied_at: DateTime<Utc>,
    ai_score: Option<i32>,
    ai_analysis: Option<Value>,
    resume_summary: Option<String>,
    resume_skills: Option<Vec<String>>,
    resume_raw_text: Option<String>,
}

impl CandidateRow {
    fn into_candidate(self) -> Candidate {
        let status = self.status.parse::<ApplicationStatus>().unwrap_or_else(|e| {
            warn!("Application {}: {e}; treating as Applied", self.application_id);
            ApplicationStatus::Applied
        });
        let analysis = stored_analysis(self.ai_score, self.ai_analysis);
        let resume_text = compose_resume_text(
            self.resume_summary.as_deref(),
            self.resume_skills.as_deref(),
            self.resume_raw_text.as_deref(),
        );

        Candidate {
            application_id: self.application_id,
            user_id: self.user_id,
            full_name: self.full_name,
            email: self.email,
            status,
            applied_at: self.applied_at,
            resume_text,
            analysis,
        }
    }
}

/// Rebuilds a cached analysis. The score column is authoritative over the JSON copy.
fn stored_analysis(ai_score: Option<i32>, ai_analysis: Option<Value>) -> Option<CandidateAnalysis> {
    let score = ai_score?.clamp(0, 100) as u8;
    let mut analysis = ai_analysis
        .and_then(|v| serde_json::from_value::<CandidateAnalysis>(v).ok())
        .unwrap_or(CandidateAnalysis {
            score,
            reasoning: String::new(),
            missing_keywords: vec![],
            source: AnalysisSource::Model,
        });
    analysis.score = score;
    Some(analysis)
}

/// Text the scorer sees for a candidate; `None` when the resume is empty or missing.
pub fn compose_resume_text(
    summary: Option<&str>,
    skills: Option<&[String]>,
    raw_text: Option<&str>,
) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(summary) = summary.map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(summary.to_string());
    }
    if let Some(skills) = skills.filter(|s| !s.is_empty()) {
        parts.push(format!("Skills: {}", skills.join(", ")));
    }
    if let Some(raw) = raw_text.map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(raw.to_string());
    }
    (!parts.is_empty()).then(|| parts.join("\n"))
}

/// Every applicant of a job, oldest application first, with the resume the
/// application names or else the applicant's most recent one.
pub async fn load_candidates(pool: &PgPool, job_id: Uuid) -> Result<Vec<Candidate>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CandidateRow>(
        r#"
        SELECT a.id AS application_id, a.user_id, p.full_name, p.email,
               a.status, a.applied_at, a.ai_score, a.ai_analysis,
               r.summary AS resume_summary, r.skills AS resume_skills,
               r.raw_text AS resume_raw_text
        FROM applications a
        JOIN user_profiles p ON p.id = a.user_id
        LEFT JOIN LATERAL (
            SELECT summary, skills, raw_text
            FROM resumes
            WHERE (a.resume_id IS NOT NULL AND id = a.resume_id)
               OR (a.resume_id IS NULL AND user_id = a.user_id)
            ORDER BY created_at DESC
            LIMIT 1
        ) r ON TRUE
        WHERE a.job_id = $1
        ORDER BY a.applied_at ASC, a.id ASC
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CandidateRow::into_candidate).collect())
}

/// Writes fresh model scores back in one transaction. Returns the number of
/// applications updated.
///
/// The Applied -> Screening advance is decided against the row as it is now,
/// not as it was loaded: scoring takes seconds, and a status set meanwhile by
/// the employer (e.g. Rejected) must survive. Each candidate's `status` and
/// `status_changed` are updated to what was actually stored.
pub async fn persist_scores(pool: &PgPool, ranked: &mut [RankedCandidate]) -> Result<usize, sqlx::Error> {
    if !ranked.iter().any(RankedCandidate::needs_persist) {
        return Ok(0);
    }

    let mut persisted = 0;
    let mut tx = pool.begin().await?;
    for ranked in ranked.iter_mut().filter(|r| r.needs_persist()) {
        let Some(analysis) = ranked.candidate.analysis.as_ref() else {
            continue;
        };
        let analysis_json = serde_json::to_value(analysis).unwrap_or(Value::Null);
        let stored_status = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE applications
            SET ai_score = $1,
                ai_analysis = $2,
                status = CASE WHEN status = $3 THEN $4 ELSE status END,
                updated_at = now()
            WHERE id = $5
            RETURNING status
            "#,
        )
        .bind(i32::from(analysis.score))
        .bind(analysis_json)
        .bind(ApplicationStatus::Applied.as_str())
        .bind(ApplicationStatus::Screening.as_str())
        .bind(ranked.candidate.application_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(stored_status) = stored_status else {
            warn!("Application {} vanished before its score was stored", ranked.candidate.application_id);
            continue;
        };
        persisted += 1;
        if let Ok(status) = stored_status.parse::<ApplicationStatus>() {
            ranked.status_changed = ranked.status_changed && status == ApplicationStatus::Screening;
            ranked.candidate.status = status;
        }
    }
    tx.commit().await?;

    info!("Persisted {persisted} candidate scores");
    Ok(persisted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compose_resume_text_joins_non_empty_parts() {
        let skills = vec!["React".to_string(), "Node.js".to_string()];
        let text = compose_resume_text(
            Some("Full Stack Engineer"),
            Some(&skills),
            Some("  4 years MERN  "),
        )
        .unwrap();
        assert_eq!(text, "Full Stack Engineer\nSkills: React, Node.js\n4 years MERN");
    }

    #[test]
    fn test_compose_resume_text_none_when_empty() {
        assert_eq!(compose_resume_text(None, None, None), None);
        assert_eq!(compose_resume_text(Some(" "), Some(&[]), Some("")), None);
    }

    #[test]
    fn test_stored_analysis_requires_score() {
        assert!(stored_analysis(None, Some(json!({"score": 50}))).is_none());
    }

    #[test]
    fn test_stored_analysis_prefers_column_score() {
        let json = json!({
            "score": 10,
            "reasoning": "Strong TypeScript.",
            "missing_keywords": ["Tailwind CSS"],
            "source": "model"
        });
        let analysis = stored_analysis(Some(85), Some(json)).unwrap();
        assert_eq!(analysis.score, 85);
        assert_eq!(analysis.reasoning, "Strong TypeScript.");
        assert_eq!(analysis.missing_keywords, vec!["Tailwind CSS"]);
    }

    #[test]
    fn test_stored_analysis_tolerates_bad_json() {
        let analysis = stored_analysis(Some(64), Some(json!("garbage"))).unwrap();
        assert_eq!(analysis.score, 64);
        assert!(analysis.reasoning.is_empty());
        assert_eq!(analysis.source, AnalysisSource::Model);
    }

    // ── Database-backed (#[sqlx::test] needs DATABASE_URL) ──────────────────

    use async_trait::async_trait;

    use crate::applications::repo::{find_application, insert_application, update_status};
    use crate::errors::AppError;
    use crate::matching::ranking::{rank_candidates, RankOptions};
    use crate::matching::scorer::{MatchScorer, SimulatedMatchScorer};
    use crate::models::user::Role;
    use crate::test_support::{seed_job, seed_profile, seed_resume};

    struct FixedScorer(u8);

    #[async_trait]
    impl MatchScorer for FixedScorer {
        async fn analyze(&self, _resume_text: &str, _job_text: &str) -> Result<CandidateAnalysis, AppError> {
            Ok(CandidateAnalysis {
                score: self.0,
                reasoning: "Solid React background.".to_string(),
                missing_keywords: vec!["GraphQL".to_string()],
                source: AnalysisSource::Model,
            })
        }

        fn backend(&self) -> &'static str {
            "fixed-test"
        }
    }

    /// A job with one applicant holding a resume. Returns (job_id, application_id).
    async fn one_applicant(pool: &PgPool) -> (Uuid, Uuid) {
        let employer = seed_profile(pool, Role::Employer, "hr@acme.test").await;
        let job = seed_job(pool, employer.id).await;
        let seeker = seed_profile(pool, Role::Seeker, "asha@example.com").await;
        seed_resume(pool, seeker.id, "React developer, 4 years").await;
        let application = insert_application(pool, job.id, seeker.id, None)
            .await
            .unwrap()
            .unwrap();
        (job.id, application.id)
    }

    async fn age_resume(pool: &PgPool, resume_id: Uuid) {
        sqlx::query("UPDATE resumes SET created_at = now() - interval '1 day' WHERE id = $1")
            .bind(resume_id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[sqlx::test]
    async fn test_load_candidates_uses_named_resume_else_latest(pool: PgPool) {
        let employer = seed_profile(&pool, Role::Employer, "hr@acme.test").await;
        let job = seed_job(&pool, employer.id).await;

        // Named resume is older than another one the seeker saved later.
        let named_owner = seed_profile(&pool, Role::Seeker, "named@example.com").await;
        let named = seed_resume(&pool, named_owner.id, "Named resume").await;
        age_resume(&pool, named.id).await;
        seed_resume(&pool, named_owner.id, "Newer resume").await;
        insert_application(&pool, job.id, named_owner.id, Some(named.id))
            .await
            .unwrap()
            .unwrap();

        // No resume named: the most recent one is used.
        let latest_owner = seed_profile(&pool, Role::Seeker, "latest@example.com").await;
        let old = seed_resume(&pool, latest_owner.id, "Old resume").await;
        age_resume(&pool, old.id).await;
        seed_resume(&pool, latest_owner.id, "Latest resume").await;
        insert_application(&pool, job.id, latest_owner.id, None)
            .await
            .unwrap()
            .unwrap();

        // Applicant with no resume at all.
        let bare = seed_profile(&pool, Role::Seeker, "bare@example.com").await;
        insert_application(&pool, job.id, bare.id, None).await.unwrap().unwrap();

        let candidates = load_candidates(&pool, job.id).await.unwrap();
        assert_eq!(candidates.len(), 3);
        let text_of = |user_id: Uuid| {
            candidates
                .iter()
                .find(|c| c.user_id == user_id)
                .and_then(|c| c.resume_text.clone())
        };
        assert_eq!(text_of(named_owner.id).as_deref(), Some("Named resume"));
        assert_eq!(text_of(latest_owner.id).as_deref(), Some("Latest resume"));
        assert_eq!(text_of(bare.id), None);
    }

    #[sqlx::test]
    async fn test_persist_scores_advances_applied_to_screening(pool: PgPool) {
        let (job_id, application_id) = one_applicant(&pool).await;
        let candidates = load_candidates(&pool, job_id).await.unwrap();
        let mut outcome = rank_candidates(&FixedScorer(82), "React", candidates, RankOptions::default()).await;

        assert_eq!(persist_scores(&pool, &mut outcome.candidates).await.unwrap(), 1);
        assert!(outcome.candidates[0].status_changed);

        let row = find_application(&pool, application_id).await.unwrap().unwrap();
        assert_eq!(row.status, "Screening");
        assert_eq!(row.ai_score, Some(82));
        assert_eq!(
            row.ai_analysis.as_ref().and_then(|v| v["reasoning"].as_str()),
            Some("Solid React background.")
        );
    }

    #[sqlx::test]
    async fn test_persist_scores_keeps_status_set_while_scoring(pool: PgPool) {
        let (job_id, application_id) = one_applicant(&pool).await;
        let candidates = load_candidates(&pool, job_id).await.unwrap();
        let mut outcome = rank_candidates(&FixedScorer(70), "React", candidates, RankOptions::default()).await;

        // The employer rejects the applicant after the candidates were loaded.
        update_status(&pool, application_id, ApplicationStatus::Applied, ApplicationStatus::Rejected)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(persist_scores(&pool, &mut outcome.candidates).await.unwrap(), 1);

        let row = find_application(&pool, application_id).await.unwrap().unwrap();
        assert_eq!(row.status, "Rejected");
        assert_eq!(row.ai_score, Some(70));

        let ranked = &outcome.candidates[0];
        assert_eq!(ranked.candidate.status, ApplicationStatus::Rejected);
        assert!(!ranked.status_changed);
    }

    #[sqlx::test]
    async fn test_persist_scores_skips_simulated_scores(pool: PgPool) {
        let (job_id, application_id) = one_applicant(&pool).await;
        let candidates = load_candidates(&pool, job_id).await.unwrap();
        let mut outcome =
            rank_candidates(&SimulatedMatchScorer, "React", candidates, RankOptions::default()).await;

        assert_eq!(persist_scores(&pool, &mut outcome.candidates).await.unwrap(), 0);

        let row = find_application(&pool, application_id).await.unwrap().unwrap();
        assert_eq!(row.status, "Applied");
        assert_eq!(row.ai_score, None);
        assert!(row.ai_analysis.is_none());
    }
}
