use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::models::job::{JobRow, JobType};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// Parameters for inserting a job posting.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub job_type: JobType,
    pub description: String,
    pub requirements: Vec<String>,
    /// `None` for system-imported postings.
    pub employer_id: Option<Uuid>,
}

/// Newest first. `search` matches title or company, case-insensitively.
pub async fn list_jobs(pool: &PgPool, search: Option<&str>, limit: i64) -> Result<Vec<JobRow>, sqlx::Error> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);

    sqlx::query_as::<_, JobRow>(
        r#"
        SELECT * FROM jobs
        WHERE $1::text IS NULL OR title ILIKE $1 OR company ILIKE $1
        ORDER BY posted_at DESC
        LIMIT $2
        "#,
    )
    .bind(pattern)
    .bind(limit.clamp(1, MAX_PAGE_SIZE))
    .fetch_all(pool)
    .await
}

pub async fn find_job(pool: &PgPool, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

/// Generic over the executor so imports can insert inside a transaction.
pub async fn insert_job<'e, E>(executor: E, job: &NewJob) -> Result<JobRow, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (title, company, location, salary, job_type, description, requirements, employer_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&job.title)
    .bind(&job.company)
    .bind(&job.location)
    .bind(&job.salary)
    .bind(job.job_type.as_str())
    .bind(&job.description)
    .bind(&job.requirements)
    .bind(job.employer_id)
    .fetch_one(executor)
    .await
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Trims requirement strings and drops empty ones.
pub fn clean_requirements<I, S>(requirements: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    requirements
        .into_iter()
        .map(|r| r.as_ref().trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("react"), "%react%");
        assert_eq!(like_pattern("100%_remote"), "%100\\%\\_remote%");
    }

    #[test]
    fn test_clean_requirements() {
        let cleaned = clean_requirements(vec![" React 18+ ", "", "  ", "TypeScript"]);
        assert_eq!(cleaned, vec!["React 18+", "TypeScript"]);
    }
}
