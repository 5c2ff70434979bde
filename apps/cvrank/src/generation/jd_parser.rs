//! JD Parser: turns a job description into `JobRequirements`.
//!
//! Only an unreadable or empty description is fatal. A failed or unparseable
//! model call degrades to heuristic requirement lines and keywords.

use std::collections::BTreeSet;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::document::read_job_description_text;
use crate::generation::prompts::JD_PARSE_PROMPT_TEMPLATE;
use crate::llm_client::prompts::{fill, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{complete_with_retry, parse_json_object, CallOptions, CompletionService};
use crate::models::job::JobRequirements;

/// Heuristic keyword cap.
const MAX_DERIVED_KEYWORDS: usize = 30;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z][a-zA-Z0-9_+.#-]{3,}").unwrap());
static REQUIREMENT_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•▪‣◦·]|\d+[.)])\s+(.+)$").unwrap());

const STOP_WORDS: &[&str] = &[
    "about", "ability", "able", "also", "and", "apply", "are", "benefits", "both", "candidate",
    "candidates", "company", "could", "does", "each", "either", "etc.", "excellent", "experience",
    "following", "from", "good", "great", "have", "help", "ideal", "including", "into", "join",
    "just", "knowledge", "least", "like", "looking", "make", "more", "most", "must", "need",
    "needs", "other", "our", "ours", "over", "plus", "preferred", "related", "required",
    "requirements", "responsibilities", "role", "should", "skills", "some", "strong", "such",
    "team", "than", "that", "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "using", "very", "want", "well", "were", "what", "when", "where", "which", "while",
    "will", "with", "within", "work", "working", "would", "year", "years", "you", "your",
];

/// Where the job description comes from.
#[derive(Debug, Clone)]
pub enum JobSource {
    Path(PathBuf),
    Text(String),
}

/// Lenient mirror of the model's JSON reply.
#[derive(Debug, Default, Deserialize)]
struct ParsedJd {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    requirements: Vec<String>,
    #[serde(default)]
    nice_to_have: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Loads the job description text. Unreadable or blank input is fatal.
pub async fn load_job_text(source: &JobSource) -> Result<String, AppError> {
    let text = match source {
        JobSource::Path(path) => read_job_description_text(path)
            .await
            .map_err(|e| AppError::JobParse(e.to_string()))?,
        JobSource::Text(text) => text.clone(),
    };
    if text.trim().is_empty() {
        return Err(AppError::JobParse(
            "job description is empty".to_string(),
        ));
    }
    Ok(text)
}

/// Parses a job description with the model and returns `JobRequirements`.
pub async fn parse_jd(
    source: &JobSource,
    llm: &dyn CompletionService,
    call: &CallOptions,
) -> Result<JobRequirements, AppError> {
    let jd_text = load_job_text(source).await?;

    let prompt = fill(
        JD_PARSE_PROMPT_TEMPLATE,
        &[
            ("json_only_instruction", JSON_ONLY_INSTRUCTION),
            ("jd_text", &jd_text),
        ],
    );

    let parsed = match complete_with_retry(llm, &prompt, call).await {
        Ok(reply) => parse_json_object::<ParsedJd>(&reply),
        Err(e) => {
            warn!("JD parsing call failed: {e}; deriving requirements heuristically");
            None
        }
    };

    let requirements = build_requirements(parsed.unwrap_or_default(), jd_text);
    info!(
        "JD parsed: title={:?}, {} requirements, {} keywords",
        requirements.title,
        requirements.requirements.len(),
        requirements.required_keywords.len()
    );
    Ok(requirements)
}

fn build_requirements(parsed: ParsedJd, raw_text: String) -> JobRequirements {
    let mut requirements = clean_list(parsed.requirements);
    if requirements.is_empty() {
        requirements = requirement_lines(&raw_text);
    }

    let mut required_keywords: BTreeSet<String> = parsed
        .keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if required_keywords.is_empty() {
        warn!("No keywords from model; deriving from requirement text");
        required_keywords = derive_keywords(&requirements, &raw_text);
    }

    JobRequirements {
        title: non_blank(parsed.title),
        company: non_blank(parsed.company),
        requirements,
        nice_to_have: clean_list(parsed.nice_to_have),
        required_keywords,
        raw_text,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect()
}

/// Bullet or numbered lines of the description.
fn requirement_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| REQUIREMENT_LINE_RE.captures(line))
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}

/// First `MAX_DERIVED_KEYWORDS` unique tokens (4+ chars, stop words removed)
/// from the requirement lines, or from the whole text when there are none.
pub fn derive_keywords(requirements: &[String], raw_text: &str) -> BTreeSet<String> {
    let source = if requirements.is_empty() {
        raw_text.to_string()
    } else {
        requirements.join("\n")
    };

    let mut seen: Vec<String> = Vec::new();
    for m in TOKEN_RE.find_iter(&source) {
        let token = m
            .as_str()
            .trim_end_matches(|c: char| c == '.' || c == '-')
            .to_lowercase();
        if token.len() < 4 || STOP_WORDS.contains(&token.as_str()) || seen.contains(&token) {
            continue;
        }
        seen.push(token);
        if seen.len() == MAX_DERIVED_KEYWORDS {
            break;
        }
    }
    seen.into_iter().collect()
}
