//! AI writing features: resume summary, resume optimization, job-description
//! drafting and synthetic job listings for the admin importer.
//!
//! Writing features never fail the request. A missing API key or a failed
//! model call yields a placeholder the UI can show as-is.

pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{render, JSON_ONLY_SYSTEM, WRITER_SYSTEM};
use crate::llm_client::LlmClient;
use prompts::{
    JOB_DESCRIPTION_PROMPT_TEMPLATE, JOB_LISTINGS_PROMPT_TEMPLATE,
    RESUME_OPTIMIZE_PROMPT_TEMPLATE, RESUME_SUMMARY_PROMPT_TEMPLATE,
};

pub const SUMMARY_UNAVAILABLE: &str = "AI service unavailable (Missing API Key).";
pub const SUMMARY_FAILED: &str = "Failed to generate summary. Please try again.";
pub const DESCRIPTION_UNAVAILABLE: &str = "AI service unavailable.";
pub const DESCRIPTION_FAILED: &str = "Failed to generate job description.";

/// ATS optimization result for a resume draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeInsights {
    pub summary: String,
    /// Keywords and skills the candidate should add.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, alias = "optimizedPoints")]
    pub optimized_points: Vec<String>,
}

impl ResumeInsights {
    fn unavailable() -> Self {
        Self {
            summary: "AI Unavailable".to_string(),
            skills: vec!["Manual Entry".to_string()],
            optimized_points: vec!["Please add API Key to use AI features.".to_string()],
        }
    }

    fn failed() -> Self {
        Self {
            summary: "Error generating content.".to_string(),
            skills: vec![],
            optimized_points: vec![],
        }
    }
}

/// A job posting produced by the listing generator, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedJob {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(rename = "type", alias = "job_type", default)]
    pub job_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// Models sometimes wrap the array in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedJobs {
    List(Vec<GeneratedJob>),
    Wrapped { jobs: Vec<GeneratedJob> },
}

impl GeneratedJob {
    /// Same required fields as a job posted by an employer.
    fn is_complete(&self) -> bool {
        [&self.title, &self.company, &self.description]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Drops listings missing a title, company or description, keeping at most `count`.
fn complete_listings(jobs: Vec<GeneratedJob>, count: usize) -> Vec<GeneratedJob> {
    let (mut complete, incomplete): (Vec<_>, Vec<_>) =
        jobs.into_iter().partition(GeneratedJob::is_complete);
    if !incomplete.is_empty() {
        warn!("Discarded {} incomplete generated listings", incomplete.len());
    }
    complete.truncate(count);
    complete
}

impl From<GeneratedJobs> for Vec<GeneratedJob> {
    fn from(value: GeneratedJobs) -> Self {
        match value {
            GeneratedJobs::List(jobs) | GeneratedJobs::Wrapped { jobs } => jobs,
        }
    }
}

#[derive(Clone, Default)]
pub struct AiService {
    llm: Option<LlmClient>,
}

impl AiService {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn generate_resume_summary(&self, experience: &str, skills: &str) -> String {
        let Some(llm) = &self.llm else {
            return SUMMARY_UNAVAILABLE.to_string();
        };

        let prompt = render(
            RESUME_SUMMARY_PROMPT_TEMPLATE,
            &[("experience", experience), ("skills", skills)],
        );
        match llm.call_text(&prompt, WRITER_SYSTEM).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Resume summary generation failed: {e}");
                SUMMARY_FAILED.to_string()
            }
        }
    }

    pub async fn optimize_resume(&self, resume_text: &str, target_role: &str) -> ResumeInsights {
        let Some(llm) = &self.llm else {
            return ResumeInsights::unavailable();
        };

        let prompt = render(
            RESUME_OPTIMIZE_PROMPT_TEMPLATE,
            &[("resume", resume_text), ("target_role", target_role)],
        );
        match llm.call_json::<ResumeInsights>(&prompt, JSON_ONLY_SYSTEM).await {
            Ok(insights) => insights,
            Err(e) => {
                warn!("Resume optimization failed: {e}");
                ResumeInsights::failed()
            }
        }
    }

    pub async fn generate_job_description(
        &self,
        title: &str,
        company: &str,
        key_requirements: &str,
    ) -> String {
        let Some(llm) = &self.llm else {
            return DESCRIPTION_UNAVAILABLE.to_string();
        };

        let prompt = render(
            JOB_DESCRIPTION_PROMPT_TEMPLATE,
            &[
                ("title", title),
                ("company", company),
                ("requirements", key_requirements),
            ],
        );
        match llm.call_text(&prompt, WRITER_SYSTEM).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Job description generation failed: {e}");
                DESCRIPTION_FAILED.to_string()
            }
        }
    }

    /// Unlike the writing helpers this one reports failure, since its output is persisted.
    pub async fn generate_job_listings(
        &self,
        platform: &str,
        keyword: &str,
        count: usize,
    ) -> Result<Vec<GeneratedJob>, AppError> {
        let llm = self.llm.as_ref().ok_or(AppError::AiUnavailable)?;

        let count_str = count.to_string();
        let prompt = render(
            JOB_LISTINGS_PROMPT_TEMPLATE,
            &[
                ("count", count_str.as_str()),
                ("platform", platform),
                ("keyword", keyword),
            ],
        );
        let jobs: Vec<GeneratedJob> = llm
            .call_json::<GeneratedJobs>(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("job listing generation failed: {e}")))?
            .into();

        let jobs = complete_listings(jobs, count);

        info!(
            "Generated {} job listings for '{keyword}' on {platform}",
            jobs.len()
        );
        Ok(jobs)
    }
}
