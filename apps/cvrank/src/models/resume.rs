use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the structured fields of a record were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Parsed from the model's JSON reply (heuristics may fill gaps).
    Model,
    /// Model unavailable or unparseable; regex/keyword rules only.
    Heuristic,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// Structured view of one resume file. Built once by the extraction layer and
/// only read afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeRecord {
    pub source_path: PathBuf,
    pub candidate_name: Option<String>,
    pub extracted_skills: BTreeSet<String>,
    pub extracted_experience: Vec<ExperienceEntry>,
    #[serde(skip)]
    pub raw_text: String,
    pub extraction: ExtractionMethod,
}

impl ResumeRecord {
    pub fn all_bullets(&self) -> impl Iterator<Item = &str> {
        self.extracted_experience
            .iter()
            .flat_map(|e| e.bullets.iter().map(String::as_str))
    }

    pub fn all_technologies(&self) -> impl Iterator<Item = &str> {
        self.extracted_experience
            .iter()
            .flat_map(|e| e.technologies.iter().map(String::as_str))
    }
}
