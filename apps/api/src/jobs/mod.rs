// Job board: listing, search, posting and AI-drafted descriptions.

pub mod handlers;
pub mod repo;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::models::user::Role;

/// Admins manage every job; employers only the jobs they posted.
pub fn ensure_can_manage(user: &CurrentUser, job: &JobRow) -> Result<(), AppError> {
    if user.is_admin() {
        return Ok(());
    }
    if user.role() == Role::Employer && job.employer_id == Some(user.profile.id) {
        return Ok(());
    }
    Err(AppError::Forbidden)
}
