//! Heuristic engine: keyword coverage, quantified impact and length.
//!
//! No model call. Identical inputs always produce identical scores.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::coverage::{candidate_keywords, keyword_coverage};
use super::explain::explain;
use super::impact::{markdown_bullets, quantified_share};
use super::{finalize, EngineScore, ScoringEngine};
use crate::generation::tailor::TailoredContent;
use crate::llm_client::CompletionError;
use crate::models::job::JobRequirements;
use crate::models::resume::ResumeRecord;

/// Word counts inside this band score a full length component.
const IDEAL_WORDS_MIN: usize = 150;
const IDEAL_WORDS_MAX: usize = 800;
/// Length component reaches zero here.
const MAX_WORDS: usize = 1600;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicWeights {
    pub coverage: f64,
    pub impact: f64,
    pub length: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            coverage: 0.6,
            impact: 0.25,
            length: 0.15,
        }
    }
}

pub struct HeuristicEngine {
    weights: HeuristicWeights,
}

impl HeuristicEngine {
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }
}

#[async_trait]
impl ScoringEngine for HeuristicEngine {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn score(
        &self,
        resume: &ResumeRecord,
        job: &JobRequirements,
        tailored: &TailoredContent<'_>,
    ) -> Result<EngineScore, CompletionError> {
        let candidate = candidate_keywords(resume, tailored);
        let coverage = keyword_coverage(&candidate, &job.required_keywords);

        // Prefer the extracted bullets; the tailored Markdown is the fallback.
        let impact = quantified_share(resume.all_bullets())
            .or_else(|| quantified_share(markdown_bullets(&tailored.tailored_text)))
            .unwrap_or(0.0);
        let length = length_score(tailored.word_count());

        let w = self.weights;
        let total = w.coverage + w.impact + w.length;
        let raw = if total > 0.0 {
            (w.coverage * coverage + w.impact * impact + w.length * length) / total
        } else {
            coverage
        };

        let alignment_score = finalize(raw);
        let keyword_coverage = finalize(coverage);
        Ok(EngineScore {
            alignment_score,
            keyword_coverage,
            notes: Vec::new(),
            explanation: Some(explain(alignment_score, keyword_coverage, job)),
            per_requirement: Vec::new(),
        })
    }
}

/// 1.0 inside the ideal band, linear ramps to 0 at 0 words and at `MAX_WORDS`.
pub fn length_score(words: usize) -> f64 {
    if words == 0 || words >= MAX_WORDS {
        0.0
    } else if words < IDEAL_WORDS_MIN {
        words as f64 / IDEAL_WORDS_MIN as f64
    } else if words <= IDEAL_WORDS_MAX {
        1.0
    } else {
        (MAX_WORDS - words) as f64 / (MAX_WORDS - IDEAL_WORDS_MAX) as f64
    }
}
