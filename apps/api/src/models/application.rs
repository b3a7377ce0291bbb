use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Hiring pipeline stage of an application.
///
/// Forward-only: `Applied → Screening → Interview → Offer`, with `Rejected`
/// reachable from any non-terminal stage. Stages may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Screening => "Screening",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Offer | ApplicationStatus::Rejected)
    }

    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        next == ApplicationStatus::Rejected || next > *self
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Applied" => Ok(ApplicationStatus::Applied),
            "Screening" => Ok(ApplicationStatus::Screening),
            "Interview" => Ok(ApplicationStatus::Interview),
            "Offer" => Ok(ApplicationStatus::Offer),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub status: String,
    pub ai_score: Option<i32>,
    pub ai_analysis: Option<Value>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRow {
    pub fn status(&self) -> Result<ApplicationStatus, String> {
        self.status.parse()
    }
}
