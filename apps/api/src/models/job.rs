use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Remote,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Remote => "Remote",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    /// Lenient: model output says "Full Time", "full-time", "FULL_TIME" interchangeably.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "fulltime" => Ok(JobType::FullTime),
            "parttime" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "remote" => Ok(JobType::Remote),
            _ => Err(format!("unknown job type '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub description: String,
    pub requirements: Vec<String>,
    /// NULL for jobs imported by the admin aggregator.
    pub employer_id: Option<Uuid>,
    pub posted_at: DateTime<Utc>,
}

impl JobRow {
    /// Text the matcher compares resumes against.
    pub fn match_text(&self) -> String {
        format!("{} {}", self.description, self.requirements.join(", "))
    }
}
