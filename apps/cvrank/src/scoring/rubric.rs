//! `resume_matcher` engine: a 0–10 rubric score from the completion service,
//! blended with keyword coverage.
//!
//! alignment = w · (rubric / 10) + (1 − w) · coverage
//!
//! The model reads the extracted resume text, not the tailored rewrite.
//! A reply without a usable 0–10 number is not an error. The score degrades
//! to coverage alone and carries `ScoreNote::ScoreDegraded`. The optional
//! `per_requirement` breakdown is kept whenever it parses, even on a degraded
//! score.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::coverage::{candidate_keywords, keyword_coverage};
use super::explain::explain;
use super::prompts::RUBRIC_PROMPT_TEMPLATE;
use super::{finalize, EngineScore, RequirementScore, ScoreNote, ScoringEngine};
use crate::generation::tailor::TailoredContent;
use crate::llm_client::prompts::{fill, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{
    complete_with_retry, parse_json_object, CallOptions, CompletionError, CompletionService,
};
use crate::models::job::JobRequirements;
use crate::models::resume::ResumeRecord;

const RUBRIC_MAX: f64 = 10.0;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());

#[derive(Debug, Deserialize)]
struct RubricReply {
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    rationale: Option<String>,
    #[serde(default)]
    per_requirement: Option<Vec<Value>>,
}

pub struct RubricEngine {
    llm: Arc<dyn CompletionService>,
    call: CallOptions,
    weight: f64,
}

impl RubricEngine {
    pub fn new(llm: Arc<dyn CompletionService>, call: CallOptions, weight: f64) -> Self {
        Self {
            llm,
            call,
            weight: weight.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl ScoringEngine for RubricEngine {
    fn name(&self) -> &'static str {
        "resume_matcher"
    }

    async fn score(
        &self,
        resume: &ResumeRecord,
        job: &JobRequirements,
        tailored: &TailoredContent<'_>,
    ) -> Result<EngineScore, CompletionError> {
        let candidate = candidate_keywords(resume, tailored);
        let coverage = keyword_coverage(&candidate, &job.required_keywords);

        let prompt = build_rubric_prompt(job, resume);
        let reply = complete_with_retry(self.llm.as_ref(), &prompt, &self.call).await?;
        let rubric = parse_rubric_reply(&reply);

        let mut notes = Vec::new();
        let raw = match rubric.score {
            Some(score) => {
                debug!(
                    "Rubric score {score} for {}",
                    resume.source_path.display()
                );
                self.weight * (score / RUBRIC_MAX) + (1.0 - self.weight) * coverage
            }
            None => {
                warn!(
                    "Unusable rubric reply for {}; using keyword coverage only",
                    resume.source_path.display()
                );
                notes.push(ScoreNote::ScoreDegraded);
                coverage
            }
        };

        let alignment_score = finalize(raw);
        let keyword_coverage = finalize(coverage);
        let tips = explain(alignment_score, keyword_coverage, job);
        let explanation = match rubric.rationale {
            Some(rationale) => format!("{rationale} | {tips}"),
            None => tips,
        };

        Ok(EngineScore {
            alignment_score,
            keyword_coverage,
            notes,
            explanation: Some(explanation),
            per_requirement: rubric.per_requirement,
        })
    }
}

fn build_rubric_prompt(job: &JobRequirements, resume: &ResumeRecord) -> String {
    let requirements = if job.requirements.is_empty() {
        "(none listed)".to_string()
    } else {
        job.requirements
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let keywords = job
        .required_keywords
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    fill(
        RUBRIC_PROMPT_TEMPLATE,
        &[
            ("json_only_instruction", JSON_ONLY_INSTRUCTION),
            ("requirements", &requirements),
            ("keywords", &keywords),
            ("resume_text", &resume.raw_text),
        ],
    )
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct ParsedRubric {
    pub score: Option<f64>,
    pub rationale: Option<String>,
    pub per_requirement: Vec<RequirementScore>,
}

/// Reads the rubric score from a JSON reply (`score`, as a number or numeric
/// string), else from the first number in the text. Values outside 0–10 count
/// as missing. Only `score` is read: a 0–1 `overall_score` would be misread
/// on the 0–10 scale.
pub(crate) fn parse_rubric_reply(reply: &str) -> ParsedRubric {
    if let Some(parsed) = parse_json_object::<RubricReply>(reply) {
        let rationale = parsed
            .rationale
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let per_requirement = parsed
            .per_requirement
            .unwrap_or_default()
            .iter()
            .filter_map(parse_requirement)
            .collect();
        return ParsedRubric {
            score: parsed.score.as_ref().and_then(as_number).filter(|s| in_range(*s)),
            rationale,
            per_requirement,
        };
    }

    let score = NUMBER_RE
        .find(reply)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|s| in_range(*s));
    ParsedRubric {
        score,
        ..Default::default()
    }
}

/// One breakdown entry. Entries without a requirement are dropped; a missing
/// or non-numeric score reads as 0.
fn parse_requirement(item: &Value) -> Option<RequirementScore> {
    let requirement = item.get("requirement")?.as_str()?.trim();
    if requirement.is_empty() {
        return None;
    }
    let score = item.get("score").and_then(as_number).unwrap_or(0.0);
    let explanation = item
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    Some(RequirementScore {
        requirement: requirement.to_string(),
        score: finalize(score),
        explanation,
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn in_range(score: f64) -> bool {
    score.is_finite() && (0.0..=RUBRIC_MAX).contains(&score)
}
