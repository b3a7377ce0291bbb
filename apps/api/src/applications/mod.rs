// Job applications: apply, seeker history with pipeline stats, and
// employer-driven status changes.

pub mod handlers;
pub mod repo;
