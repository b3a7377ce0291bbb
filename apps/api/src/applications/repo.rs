use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::application::{ApplicationRow, ApplicationStatus};

/// Job fields shown next to an application in the seeker's history.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobSummary {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationHistoryItem {
    pub id: Uuid,
    pub job_id: Uuid,
    pub status: String,
    pub ai_score: Option<i32>,
    pub applied_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub job: JobSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub interviewing: usize,
    pub offers: usize,
}

/// Inserts an application in status `Applied`.
/// Returns `None` when the caller already applied to this job.
pub async fn insert_application(
    pool: &PgPool,
    job_id: Uuid,
    user_id: Uuid,
    resume_id: Option<Uuid>,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (job_id, user_id, resume_id, status)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (job_id, user_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(user_id)
    .bind(resume_id)
    .bind(ApplicationStatus::Applied.as_str())
    .fetch_optional(pool)
    .await?;

    if let Some(app) = &row {
        info!("User {user_id} applied to job {job_id} (application {})", app.id);
    }
    Ok(row)
}

/// The user's applications joined with their jobs, newest first.
pub async fn application_history(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ApplicationHistoryItem>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationHistoryItem>(
        r#"
        SELECT a.id, a.job_id, a.status, a.ai_score, a.applied_at,
               j.title, j.company, j.location, j.job_type
        FROM applications a
        JOIN jobs j ON j.id = a.job_id
        WHERE a.user_id = $1
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_application(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(application_id)
        .fetch_optional(pool)
        .await
}

/// Writes a new status. `expected` guards against a concurrent change;
/// `None` is returned if the row no longer has that status.
pub async fn update_status(
    pool: &PgPool,
    application_id: Uuid,
    expected: ApplicationStatus,
    next: ApplicationStatus,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET status = $1, updated_at = now()
        WHERE id = $2 AND status = $3
        RETURNING *
        "#,
    )
    .bind(next.as_str())
    .bind(application_id)
    .bind(expected.as_str())
    .fetch_optional(pool)
    .await
}

pub fn compute_stats(items: &[ApplicationHistoryItem]) -> ApplicationStats {
    items.iter().fold(ApplicationStats::default(), |mut acc, item| {
        acc.total += 1;
        match item.status.parse::<ApplicationStatus>() {
            Ok(ApplicationStatus::Interview) => acc.interviewing += 1,
            Ok(ApplicationStatus::Offer) => acc.offers += 1,
            _ => {}
        }
        acc
    })
}
