//! Ranking output types and the ordering rule.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extraction::ExtractionError;
use crate::llm_client::CompletionError;
use crate::scoring::{EngineChoice, RequirementScore, ScoreNote};

/// Per-resume failure categories. These never abort a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    UnsupportedFormat,
    ExtractionError,
    ServiceUnavailable,
    Timeout,
    ModelNotFound,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::UnsupportedFormat => "UnsupportedFormat",
            FailureKind::ExtractionError => "ExtractionError",
            FailureKind::ServiceUnavailable => "ServiceUnavailable",
            FailureKind::Timeout => "Timeout",
            FailureKind::ModelNotFound => "ModelNotFound",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<ExtractionError> for ItemError {
    fn from(e: ExtractionError) -> Self {
        let kind = match e {
            ExtractionError::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            ExtractionError::Unreadable { .. } | ExtractionError::Extraction(_) => {
                FailureKind::ExtractionError
            }
        };
        ItemError {
            kind,
            message: e.to_string(),
        }
    }
}

impl From<CompletionError> for ItemError {
    fn from(e: CompletionError) -> Self {
        let kind = match e {
            CompletionError::Timeout(_) => FailureKind::Timeout,
            CompletionError::ModelNotFound(_) => FailureKind::ModelNotFound,
            CompletionError::ServiceUnavailable(_)
            | CompletionError::Api { .. }
            | CompletionError::EmptyContent => FailureKind::ServiceUnavailable,
        };
        ItemError {
            kind,
            message: e.to_string(),
        }
    }
}

/// One row of the ranking. Failed items keep zero scores and carry `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub rank: usize,
    pub name: Option<String>,
    pub resume_path: PathBuf,
    pub alignment_score: f64,
    pub keyword_coverage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<ScoreNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_requirement: Vec<RequirementScore>,
}

impl ScoreResult {
    /// Unranked failure row for `path`.
    pub fn failed(resume_path: PathBuf, name: Option<String>, error: ItemError) -> Self {
        Self {
            rank: 0,
            name,
            resume_path,
            alignment_score: 0.0,
            keyword_coverage: 0.0,
            error: Some(error),
            notes: Vec::new(),
            explanation: None,
            per_requirement: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub engine: EngineChoice,
    pub model: String,
    pub job_title: Option<String>,
    pub job_keywords: BTreeSet<String>,
    pub generated_at: DateTime<Utc>,
    pub candidates: Vec<ScoreResult>,
}

impl RankingReport {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn failed_count(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_failed()).count()
    }
}

/// Successes first by alignment desc, coverage desc, path asc; then failures
/// by path asc.
fn compare(a: &ScoreResult, b: &ScoreResult) -> Ordering {
    a.is_failed()
        .cmp(&b.is_failed())
        .then_with(|| b.alignment_score.total_cmp(&a.alignment_score))
        .then_with(|| b.keyword_coverage.total_cmp(&a.keyword_coverage))
        .then_with(|| a.resume_path.cmp(&b.resume_path))
}

/// Sorts and assigns contiguous ranks starting at 1.
pub fn assign_ranks(mut results: Vec<ScoreResult>) -> Vec<ScoreResult> {
    results.sort_by(compare);
    for (i, result) in results.iter_mut().enumerate() {
        result.rank = i + 1;
    }
    results
}
