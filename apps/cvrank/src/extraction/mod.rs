//! Extraction: turns a resume file into a `ResumeRecord`.
//!
//! Contract: every file whose text can be read yields a record. When the model
//! is unavailable or its reply cannot be parsed, the record is built from
//! `fields` heuristics and marked `ExtractionMethod::Heuristic`.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm_client::prompts::{fill, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{complete_with_retry, parse_json_object, CallOptions, CompletionService};
use crate::models::resume::{ExperienceEntry, ExtractionMethod, ResumeRecord};

pub mod document;
pub mod fields;
pub mod prompts;

use prompts::RESUME_EXTRACTION_PROMPT;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported format: {0} (expected .pdf, .docx or .txt)")]
    UnsupportedFormat(String),

    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("text extraction failed: {0}")]
    Extraction(String),
}

/// Lenient mirror of the model's JSON reply. Every field is optional so a
/// partially filled reply still parses.
#[derive(Debug, Default, Deserialize)]
struct ParsedResume {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    experience: Vec<ParsedExperience>,
}

#[derive(Debug, Default, Deserialize)]
struct ParsedExperience {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    bullets: Vec<String>,
    #[serde(default)]
    technologies: Vec<String>,
}

impl ParsedResume {
    fn is_empty(&self) -> bool {
        self.name.as_deref().map(str::trim).unwrap_or("").is_empty()
            && self.skills.is_empty()
            && self.experience.is_empty()
    }
}

/// Reads `path` and structures it into a `ResumeRecord`.
pub async fn extract_resume(
    path: &Path,
    llm: &dyn CompletionService,
    call: &CallOptions,
) -> Result<ResumeRecord, ExtractionError> {
    let text = document::read_document_text(path).await?;
    Ok(structure_resume(path, text, llm, call).await)
}

/// Structures already-extracted text. Never fails: model problems degrade to
/// heuristics.
pub async fn structure_resume(
    path: &Path,
    text: String,
    llm: &dyn CompletionService,
    call: &CallOptions,
) -> ResumeRecord {
    let prompt = fill(
        RESUME_EXTRACTION_PROMPT,
        &[
            ("json_only_instruction", JSON_ONLY_INSTRUCTION),
            ("resume_text", &text),
        ],
    );

    let parsed = match complete_with_retry(llm, &prompt, call).await {
        Ok(reply) => parse_json_object::<ParsedResume>(&reply).filter(|p| !p.is_empty()),
        Err(e) => {
            warn!(
                "Resume extraction call failed for {}: {e}; using heuristics",
                path.display()
            );
            None
        }
    };

    match parsed {
        Some(parsed) => {
            debug!("Structured {} from model reply", path.display());
            from_model(path, text, parsed)
        }
        None => {
            warn!(
                "No structured fields for {}; falling back to heuristic extraction",
                path.display()
            );
            heuristic_record(path, text)
        }
    }
}

/// Model fields win; gaps are filled from heuristics.
fn from_model(path: &Path, text: String, parsed: ParsedResume) -> ResumeRecord {
    let candidate_name = parsed
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .or_else(|| fields::guess_name(&text));

    let mut extracted_skills: BTreeSet<String> = parsed
        .skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if extracted_skills.is_empty() {
        extracted_skills = fields::extract_skills(&text);
    }

    let mut extracted_experience: Vec<ExperienceEntry> = parsed
        .experience
        .into_iter()
        .filter(|e| e.title.is_some() || !e.bullets.is_empty())
        .map(|e| ExperienceEntry {
            title: e.title.unwrap_or_else(|| "Experience".to_string()),
            company: e.company.filter(|c| !c.trim().is_empty()),
            bullets: e.bullets,
            technologies: e.technologies,
        })
        .collect();
    if extracted_experience.is_empty() {
        extracted_experience = fields::extract_experience(&text);
    }

    ResumeRecord {
        source_path: path.to_path_buf(),
        candidate_name,
        extracted_skills,
        extracted_experience,
        raw_text: text,
        extraction: ExtractionMethod::Model,
    }
}

fn heuristic_record(path: &Path, text: String) -> ResumeRecord {
    ResumeRecord {
        source_path: path.to_path_buf(),
        candidate_name: fields::guess_name(&text),
        extracted_skills: fields::extract_skills(&text),
        extracted_experience: fields::extract_experience(&text),
        raw_text: text,
        extraction: ExtractionMethod::Heuristic,
    }
}
