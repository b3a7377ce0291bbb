// Candidate-to-job matching: per-candidate AI scoring, ranking, score caching
// and the Applied → Screening transition for freshly scored applications.

pub mod handlers;
pub mod prompts;
pub mod ranking;
pub mod repo;
pub mod scorer;
