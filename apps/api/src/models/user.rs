use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Seeker,
    Employer,
    Admin,
    College,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seeker => "SEEKER",
            Role::Employer => "EMPLOYER",
            Role::Admin => "ADMIN",
            Role::College => "COLLEGE",
        }
    }

    /// Roles a visitor may pick for themselves at sign-up.
    pub fn is_self_assignable(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SEEKER" => Ok(Role::Seeker),
            "EMPLOYER" => Ok(Role::Employer),
            "ADMIN" => Ok(Role::Admin),
            "COLLEGE" => Ok(Role::College),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Rows are CHECK-constrained, so an unknown role means a corrupted row;
    /// it is treated as the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Seeker)
    }
}
