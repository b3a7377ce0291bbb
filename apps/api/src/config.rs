use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Base URL of the hosted auth REST API, e.g. `https://<project>.supabase.co/auth/v1`.
    pub auth_url: String,
    pub auth_api_key: String,
    /// When absent, every AI feature degrades to its placeholder output.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on concurrent scoring requests during a ranking run.
    pub ranking_concurrency: usize,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            auth_url: require_env("AUTH_URL")?
                .trim_end_matches('/')
                .to_string(),
            auth_api_key: require_env("AUTH_API_KEY")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ranking_concurrency: std::env::var("RANKING_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()
                .context("RANKING_CONCURRENCY must be a positive integer")?
                .max(1),
            run_migrations: parse_flag(std::env::var("RUN_MIGRATIONS").ok().as_deref(), true),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Empty values count as unset so `ANTHROPIC_API_KEY=` in a .env disables AI.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        assert!(parse_flag(Some("TRUE"), false));
        assert!(parse_flag(Some("1"), false));
        assert!(!parse_flag(Some("off"), true));
        assert!(!parse_flag(Some("No"), true));
    }

    #[test]
    fn test_parse_flag_falls_back_to_default() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(Some("maybe"), false));
    }
}
