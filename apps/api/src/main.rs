mod admin;
mod ai;
mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod resumes;
mod routes;
mod state;
mod subscriptions;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::ai::AiService;
use crate::auth::AuthClient;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::LlmClient;
use crate::matching::scorer::{LlmMatchScorer, MatchScorer, SimulatedMatchScorer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireGen API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    if config.run_migrations {
        run_migrations(&db).await?;
    }

    // Hosted auth service
    let auth = Arc::new(AuthClient::new(&config.auth_url, &config.auth_api_key)?);
    info!("Auth client initialized ({})", config.auth_url);

    // LLM client is optional; without a key AI features fall back to placeholders
    let llm = match config.anthropic_api_key.clone() {
        Some(key) => {
            let llm = LlmClient::new(key)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(llm)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; AI features will return placeholder output");
            None
        }
    };

    let scorer: Arc<dyn MatchScorer> = match &llm {
        Some(llm) => Arc::new(LlmMatchScorer(llm.clone())),
        None => Arc::new(SimulatedMatchScorer),
    };
    info!(
        "Match scorer: {} (ranking concurrency {})",
        scorer.backend(),
        config.ranking_concurrency
    );

    // Build app state
    let state = AppState {
        db,
        auth,
        ai: AiService::new(llm),
        scorer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web client's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
