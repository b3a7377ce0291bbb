use std::sync::Arc;

use sqlx::PgPool;

use crate::ai::AiService;
use crate::auth::AuthProvider;
use crate::config::Config;
use crate::matching::scorer::MatchScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Hosted auth service. Tests swap in a stub.
    pub auth: Arc<dyn AuthProvider>,
    /// Resume, job-description and listing generation. Disabled without an API key.
    pub ai: AiService,
    /// Pluggable match scorer. LLM-backed when an API key is set, simulated otherwise.
    pub scorer: Arc<dyn MatchScorer>,
    pub config: Config,
}
