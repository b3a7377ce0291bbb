//! Axum route handlers for the admin panel.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::ai::GeneratedJob;
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::jobs::repo::{clean_requirements, insert_job, NewJob};
use crate::models::job::{JobRow, JobType};
use crate::models::user::Role;
use crate::state::AppState;

pub const IMPORT_PLATFORMS: &[&str] = &[
    "Naukri.com",
    "LinkedIn Jobs",
    "Indeed India",
    "Monster.com",
    "TimesJobs",
];

const DEFAULT_IMPORT_COUNT: usize = 5;
const MAX_IMPORT_COUNT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub platform: String,
    pub keyword: String,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub platform: String,
    pub keyword: String,
    pub jobs: Vec<JobRow>,
    pub log: Vec<String>,
}

/// Timestamped progress lines returned with an import.
#[derive(Debug, Default)]
struct ImportLog(Vec<String>);

impl ImportLog {
    fn push(&mut self, message: impl AsRef<str>) {
        let line = format!("[{}] {}", Utc::now().format("%H:%M:%S"), message.as_ref());
        info!("{line}");
        self.0.push(line);
    }
}

/// Normalized import parameters: (platform, keyword, count).
fn validate_import(request: &ImportRequest) -> Result<(&'static str, String, usize), AppError> {
    let platform = IMPORT_PLATFORMS
        .iter()
        .copied()
        .find(|p| p.eq_ignore_ascii_case(request.platform.trim()))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "unsupported platform '{}'; expected one of: {}",
                request.platform,
                IMPORT_PLATFORMS.join(", ")
            ))
        })?;

    let keyword = request.keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::Validation("keyword cannot be empty".to_string()));
    }

    let count = request.count.unwrap_or(DEFAULT_IMPORT_COUNT);
    if !(1..=MAX_IMPORT_COUNT).contains(&count) {
        return Err(AppError::Validation(format!(
            "count must be between 1 and {MAX_IMPORT_COUNT}"
        )));
    }

    Ok((platform, keyword.to_string(), count))
}

fn to_new_job(generated: GeneratedJob) -> NewJob {
    let job_type = generated.job_type.parse::<JobType>().unwrap_or_else(|e| {
        warn!("{e}; defaulting imported job '{}' to Full-time", generated.title);
        JobType::default()
    });

    NewJob {
        title: generated.title.trim().to_string(),
        company: generated.company.trim().to_string(),
        location: generated.location.trim().to_string(),
        salary: generated.salary.trim().to_string(),
        job_type,
        description: generated.description.trim().to_string(),
        requirements: clean_requirements(&generated.requirements),
        employer_id: None,
    }
}

/// POST /api/v1/admin/import
///
/// Generates synthetic listings for a portal and keyword, then stores them
/// all in one transaction.
pub async fn handle_import(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    user.require_role(&[Role::Admin])?;
    let (platform, keyword, count) = validate_import(&request)?;

    if !state.ai.is_enabled() {
        return Err(AppError::AiUnavailable);
    }

    let mut log = ImportLog::default();
    log.push("Initializing AI Scraper Agent...");
    log.push(format!("Connecting to {platform} via Virtual Browser..."));

    let generated = match state.ai.generate_job_listings(platform, &keyword, count).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!("Job import from {platform} failed: {e}");
            return Err(e);
        }
    };
    log.push(format!("Successfully parsed {} jobs from {platform}.", generated.len()));

    log.push("Syncing with HireGen Database...");
    let mut tx = state.db.begin().await?;
    let mut jobs = Vec::with_capacity(generated.len());
    for job in generated.into_iter().map(to_new_job) {
        jobs.push(insert_job(&mut *tx, &job).await?);
    }
    tx.commit().await?;
    log.push(format!("Done! Added {} new jobs to the live board.", jobs.len()));

    info!(
        "Admin {} imported {} '{keyword}' jobs from {platform}",
        user.profile.id,
        jobs.len()
    );
    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            platform: platform.to_string(),
            keyword,
            jobs,
            log: log.0,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(platform: &str, keyword: &str, count: Option<usize>) -> ImportRequest {
        ImportRequest {
            platform: platform.to_string(),
            keyword: keyword.to_string(),
            count,
        }
    }

    #[test]
    fn test_validate_defaults_count() {
        let (platform, keyword, count) =
            validate_import(&request("linkedin jobs", " React Developer ", None)).unwrap();
        assert_eq!(platform, "LinkedIn Jobs");
        assert_eq!(keyword, "React Developer");
        assert_eq!(count, 5);
    }

    #[test]
    fn test_validate_rejects_unknown_platform() {
        assert!(matches!(
            validate_import(&request("Craigslist", "React", Some(3))),
            Err(AppError::Validation(msg)) if msg.contains("Naukri.com")
        ));
    }

    #[test]
    fn test_validate_count_bounds() {
        assert!(validate_import(&request("TimesJobs", "Sales", Some(0))).is_err());
        assert!(validate_import(&request("TimesJobs", "Sales", Some(21))).is_err());
        assert!(validate_import(&request("TimesJobs", "Sales", Some(20))).is_ok());
    }

    #[test]
    fn test_validate_requires_keyword() {
        assert!(validate_import(&request("Naukri.com", "  ", None)).is_err());
    }

    #[test]
    fn test_to_new_job_normalizes_generated_listing() {
        let generated: GeneratedJob = serde_json::from_str(
            r#"{"title": " Data Analyst ", "company": "Infosys", "location": "Pune",
                "salary": "₹8L - ₹12L", "type": "full time",
                "description": "Dashboards.", "requirements": ["SQL", "", "Power BI"]}"#,
        )
        .unwrap();
        let job = to_new_job(generated);
        assert_eq!(job.title, "Data Analyst");
        assert_eq!(job.job_type, JobType::FullTime);
        assert_eq!(job.requirements, vec!["SQL", "Power BI"]);
        assert_eq!(job.employer_id, None);
    }

    #[test]
    fn test_to_new_job_defaults_unknown_type() {
        let generated: GeneratedJob = serde_json::from_str(
            r#"{"title": "Intern", "company": "Zoho", "type": "Internship", "description": "Learn."}"#,
        )
        .unwrap();
        assert_eq!(to_new_job(generated).job_type, JobType::FullTime);
    }

    #[test]
    fn test_import_log_lines_are_timestamped() {
        let mut log = ImportLog::default();
        log.push("Initializing AI Scraper Agent...");
        let line = &log.0[0];
        assert!(line.starts_with('['));
        assert!(line.ends_with("] Initializing AI Scraper Agent..."));
        assert_eq!(line.find(']'), Some(9));
    }
}
