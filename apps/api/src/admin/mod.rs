// Admin tooling: AI-assisted import of job listings from external portals.

pub mod handlers;
