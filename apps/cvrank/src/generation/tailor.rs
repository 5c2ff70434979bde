//! Tailoring: rewrites a structured resume against the parsed JD.
//!
//! The tailored Markdown is scoring input only; it is not persisted.

use serde_json::json;
use tracing::debug;

use crate::generation::prompts::TAILORING_PROMPT_TEMPLATE;
use crate::llm_client::prompts::fill;
use crate::llm_client::{complete_with_retry, CallOptions, CompletionError, CompletionService};
use crate::models::job::JobRequirements;
use crate::models::resume::ResumeRecord;

const TONE: &str = "concise";
const LENGTH: &str = "1page";

/// A job-specific rewrite of one resume, borrowing the record it came from.
#[derive(Debug, Clone)]
pub struct TailoredContent<'a> {
    pub resume: &'a ResumeRecord,
    pub tailored_text: String,
}

impl TailoredContent<'_> {
    pub fn word_count(&self) -> usize {
        self.tailored_text.split_whitespace().count()
    }
}

/// Produces the tailored Markdown for `resume`.
pub async fn tailor_resume<'a>(
    resume: &'a ResumeRecord,
    job: &JobRequirements,
    llm: &dyn CompletionService,
    call: &CallOptions,
) -> Result<TailoredContent<'a>, CompletionError> {
    let prompt = build_tailoring_prompt(resume, job);
    let text = complete_with_retry(llm, &prompt, call).await?;
    let tailored_text = strip_markdown_fence(&text).to_string();
    if tailored_text.is_empty() {
        return Err(CompletionError::EmptyContent);
    }

    debug!(
        "Tailored {} ({} words)",
        resume.source_path.display(),
        tailored_text.split_whitespace().count()
    );

    Ok(TailoredContent {
        resume,
        tailored_text,
    })
}

fn build_tailoring_prompt(resume: &ResumeRecord, job: &JobRequirements) -> String {
    let resume_json = json!({
        "name": resume.candidate_name,
        "skills": resume.extracted_skills,
        "experience": resume.extracted_experience,
    });
    let jd_json = json!({
        "title": job.title,
        "company": job.company,
        "requirements": job.requirements,
        "nice_to_have": job.nice_to_have,
        "keywords": job.required_keywords,
    });
    let keywords = job
        .required_keywords
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let role = job.title.as_deref().unwrap_or("target role");

    // Resume content goes in last so placeholders inside it are left alone.
    fill(
        TAILORING_PROMPT_TEMPLATE,
        &[
            ("tone", TONE),
            ("role", role),
            ("length", LENGTH),
            ("keywords", &keywords),
            ("jd_json", &format!("{jd_json:#}")),
            ("resume_json", &format!("{resume_json:#}")),
        ],
    )
}

/// Drops a surrounding ```markdown / ``` fence if the model added one.
fn strip_markdown_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("markdown")
        .or_else(|| rest.strip_prefix("md"))
        .unwrap_or(rest);
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::llm_client::testing::StubCompletion;
    use crate::models::resume::{ExperienceEntry, ExtractionMethod};

    fn record() -> ResumeRecord {
        ResumeRecord {
            source_path: PathBuf::from("jane.pdf"),
            candidate_name: Some("Jane Doe".to_string()),
            extracted_skills: BTreeSet::from(["rust".to_string()]),
            extracted_experience: vec![ExperienceEntry {
                title: "Engineer".to_string(),
                bullets: vec!["Cut costs by 30%".to_string()],
                ..Default::default()
            }],
            raw_text: "Jane Doe".to_string(),
            extraction: ExtractionMethod::Model,
        }
    }

    fn job() -> JobRequirements {
        JobRequirements {
            title: Some("Rust Engineer".to_string()),
            required_keywords: BTreeSet::from(["rust".to_string(), "kafka".to_string()]),
            raw_text: "Rust Engineer".to_string(),
            ..Default::default()
        }
    }

    fn call() -> CallOptions {
        CallOptions::new("gemma:2b", Duration::from_secs(5))
    }

    #[test]
    fn test_prompt_carries_role_keywords_and_resume() {
        let prompt = build_tailoring_prompt(&record(), &job());
        assert!(prompt.contains("TAILOR_RESUME"));
        assert!(prompt.contains("Target role: Rust Engineer"));
        assert!(prompt.contains("kafka, rust"));
        assert!(prompt.contains("Cut costs by 30%"));
        assert!(!prompt.contains("{resume_json}"));
    }

    #[tokio::test]
    async fn test_tailored_text_references_source_record() {
        let resume = record();
        let llm = StubCompletion::new("```markdown\n# Jane Doe\n- Rust, 30% cost cut\n```");
        let tailored = tailor_resume(&resume, &job(), &llm, &call()).await.unwrap();
        assert_eq!(tailored.tailored_text, "# Jane Doe\n- Rust, 30% cost cut");
        assert_eq!(tailored.resume.source_path, PathBuf::from("jane.pdf"));
        assert_eq!(tailored.word_count(), 8);
    }

    #[tokio::test]
    async fn test_fence_only_reply_is_empty_content() {
        let resume = record();
        let llm = StubCompletion::new("```\n```");
        let err = tailor_resume(&resume, &job(), &llm, &call()).await.unwrap_err();
        assert!(matches!(err, CompletionError::EmptyContent));
    }

    #[test]
    fn test_strip_markdown_fence_passthrough() {
        assert_eq!(strip_markdown_fence("  # Title  "), "# Title");
    }
}
