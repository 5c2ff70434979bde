use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Parsed job description. Built once per batch and shared read-only by every
/// resume evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequirements {
    pub title: Option<String>,
    pub company: Option<String>,
    pub requirements: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub required_keywords: BTreeSet<String>,
    #[serde(skip)]
    pub raw_text: String,
}

impl JobRequirements {
    pub fn has_requirements(&self) -> bool {
        !self.requirements.is_empty()
    }
}
