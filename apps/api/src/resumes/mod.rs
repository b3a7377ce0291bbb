// Resume builder: AI summary and ATS optimization, plus saved resumes.

pub mod handlers;
pub mod repo;
