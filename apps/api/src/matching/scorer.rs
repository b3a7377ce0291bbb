//! Match scoring: pluggable, trait-based scorer that rates a resume against a job.
//!
//! `LlmMatchScorer` asks the model; `SimulatedMatchScorer` stands in when no
//! API key is configured. `AppState` holds an `Arc<dyn MatchScorer>` chosen at startup.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::matching::prompts::{build_match_prompt, MATCH_SYSTEM};

const MAX_MISSING_KEYWORDS: usize = 3;

/// Where an analysis came from. Only `Model` results are stored on the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Model,
    Simulated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnalysis {
    pub score: u8, // 0 – 100
    pub reasoning: String,
    pub missing_keywords: Vec<String>,
    pub source: AnalysisSource,
}

impl CandidateAnalysis {
    /// Shown in place of a score when the scorer call fails.
    pub fn failed() -> Self {
        Self {
            score: 0,
            reasoning: "AI analysis failed.".to_string(),
            missing_keywords: vec![],
            source: AnalysisSource::Fallback,
        }
    }

    pub fn is_cacheable(&self) -> bool {
        self.source == AnalysisSource::Model
    }
}

/// Raw model reply; the score may come back as a float or out of range.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    score: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default, alias = "missingKeywords")]
    missing_keywords: Vec<String>,
}

impl ModelVerdict {
    fn into_analysis(self) -> CandidateAnalysis {
        let score = if self.score.is_finite() {
            self.score.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        let missing_keywords = self
            .missing_keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .take(MAX_MISSING_KEYWORDS)
            .collect();

        CandidateAnalysis {
            score,
            reasoning: self.reasoning.trim().to_string(),
            missing_keywords,
            source: AnalysisSource::Model,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching the ranking workflow.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn analyze(&self, resume_text: &str, job_text: &str) -> Result<CandidateAnalysis, AppError>;

    /// "llm" or "simulated"; echoed in ranking responses.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmMatchScorer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmMatchScorer(pub LlmClient);

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn analyze(&self, resume_text: &str, job_text: &str) -> Result<CandidateAnalysis, AppError> {
        let prompt = build_match_prompt(resume_text, job_text);
        let verdict = self
            .0
            .call_json::<ModelVerdict>(&prompt, MATCH_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("candidate match scoring failed: {e}")))?;
        Ok(verdict.into_analysis())
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimulatedMatchScorer
// ────────────────────────────────────────────────────────────────────────────

/// Placeholder scorer for deployments without an AI key: a random score in [50, 90).
pub struct SimulatedMatchScorer;

#[async_trait]
impl MatchScorer for SimulatedMatchScorer {
    async fn analyze(&self, _resume_text: &str, _job_text: &str) -> Result<CandidateAnalysis, AppError> {
        let score = rand::thread_rng().gen_range(50..90);
        Ok(CandidateAnalysis {
            score,
            reasoning: "API Key missing. Simulated Score.".to_string(),
            missing_keywords: vec!["API Key".to_string()],
            source: AnalysisSource::Simulated,
        })
    }

    fn backend(&self) -> &'static str {
        "simulated"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
