//! Human-readable improvement tips for a score.

use crate::models::job::JobRequirements;

const LOW_COVERAGE: f64 = 0.6;
const LOW_ALIGNMENT: f64 = 0.6;

/// Tips joined with `"; "`. Always returns at least one tip.
pub fn explain(alignment: f64, coverage: f64, job: &JobRequirements) -> String {
    let mut tips: Vec<&str> = Vec::new();
    if coverage < LOW_COVERAGE {
        tips.push("Add missing JD keywords to skills and experience bullets");
    }
    if alignment < LOW_ALIGNMENT {
        tips.push("Rephrase bullets to mirror the JD's requirement wording");
    }
    if !job.has_requirements() {
        tips.push("JD has no explicit requirements; alignment is keyword-driven");
    }
    if tips.is_empty() {
        tips.push("Great alignment");
    }
    tips.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with_requirements() -> JobRequirements {
        JobRequirements {
            requirements: vec!["Rust".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_high_scores_are_great() {
        assert_eq!(explain(0.9, 0.9, &job_with_requirements()), "Great alignment");
    }

    #[test]
    fn test_low_scores_collect_tips() {
        let tips = explain(0.2, 0.1, &job_with_requirements());
        assert!(tips.contains("missing JD keywords"));
        assert!(tips.contains("Rephrase bullets"));
        assert!(!tips.contains("Great"));
    }

    #[test]
    fn test_missing_requirements_is_flagged() {
        let tips = explain(0.9, 0.9, &JobRequirements::default());
        assert!(tips.starts_with("JD has no explicit requirements"));
    }
}
