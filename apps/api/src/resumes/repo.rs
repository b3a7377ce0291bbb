use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::ResumeRow;

pub struct NewResume<'a> {
    pub user_id: Uuid,
    pub title: &'a str,
    pub summary: &'a str,
    pub skills: &'a [String],
    pub raw_text: &'a str,
}

pub async fn insert_resume(pool: &PgPool, resume: NewResume<'_>) -> Result<ResumeRow, sqlx::Error> {
    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (user_id, title, summary, skills, raw_text)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(resume.user_id)
    .bind(resume.title)
    .bind(resume.summary)
    .bind(resume.skills)
    .bind(resume.raw_text)
    .fetch_one(pool)
    .await?;

    info!("Saved resume {} for user {}", row.id, row.user_id);
    Ok(row)
}

pub async fn list_resumes(pool: &PgPool, user_id: Uuid) -> Result<Vec<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn find_resume(pool: &PgPool, resume_id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
        .bind(resume_id)
        .fetch_optional(pool)
        .await
}
