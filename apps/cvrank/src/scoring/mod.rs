//! Scoring: pluggable engines that measure a resume against the parsed JD.
//!
//! `heuristic` (default): deterministic keyword/structure rules, no model call.
//! `resume_matcher`: rubric score from the completion service blended with
//! keyword coverage.
//!
//! Both engines compute coverage through `coverage::keyword_coverage`, so
//! coverage figures are comparable across engines.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::tailor::TailoredContent;
use crate::llm_client::{CallOptions, CompletionError, CompletionService};
use crate::models::job::JobRequirements;
use crate::models::resume::ResumeRecord;

pub mod coverage;
pub mod explain;
pub mod heuristic;
pub mod impact;
pub mod prompts;
pub mod rubric;

use heuristic::{HeuristicEngine, HeuristicWeights};
use rubric::RubricEngine;

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all engines)
// ────────────────────────────────────────────────────────────────────────────

/// Non-fatal annotations attached to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreNote {
    /// The rubric reply had no usable number; alignment is coverage only.
    ScoreDegraded,
}

/// How well one job requirement is met, as judged by the rubric engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementScore {
    pub requirement: String,
    /// In [0, 1].
    pub score: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub explanation: String,
}

/// What an engine returns for one resume. Both figures are in [0, 1] and
/// rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineScore {
    pub alignment_score: f64,
    pub keyword_coverage: f64,
    pub notes: Vec<ScoreNote>,
    pub explanation: Option<String>,
    /// Empty for engines without a per-requirement breakdown.
    pub per_requirement: Vec<RequirementScore>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to add a backend without touching the orchestrator.
#[async_trait]
pub trait ScoringEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(
        &self,
        resume: &ResumeRecord,
        job: &JobRequirements,
        tailored: &TailoredContent<'_>,
    ) -> Result<EngineScore, CompletionError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Engine selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineChoice {
    Heuristic,
    ResumeMatcher,
}

impl EngineChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineChoice::Heuristic => "heuristic",
            EngineChoice::ResumeMatcher => "resume_matcher",
        }
    }

    /// Builds the engine. The model name and timeout arrive through `call`;
    /// engines never read configuration themselves.
    pub fn build(
        self,
        llm: Arc<dyn CompletionService>,
        call: CallOptions,
        rubric_weight: f64,
        heuristic_weights: HeuristicWeights,
    ) -> Arc<dyn ScoringEngine> {
        match self {
            EngineChoice::Heuristic => Arc::new(HeuristicEngine::new(heuristic_weights)),
            EngineChoice::ResumeMatcher => Arc::new(RubricEngine::new(llm, call, rubric_weight)),
        }
    }
}

impl Default for EngineChoice {
    fn default() -> Self {
        EngineChoice::Heuristic
    }
}

impl fmt::Display for EngineChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineChoice {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(EngineChoice::Heuristic),
            "resume_matcher" | "resume-matcher" => Ok(EngineChoice::ResumeMatcher),
            _ => Err(AppError::UnknownEngine(s.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared numeric helpers
// ────────────────────────────────────────────────────────────────────────────

/// Clamps to [0, 1] (NaN becomes 0) and rounds to 3 decimals.
pub fn finalize(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    (value.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}
