//! Regex and keyword rules used when the model cannot structure a document.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::resume::ExperienceEntry;

static NAME_STARTS_WITH_PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?\d").unwrap());
static SKILLS_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:technical\s+|core\s+|key\s+)?(?:skills|technologies|tech\s+stack|competencies|tools)\s*(?:[:\-–]\s*(.*))?$",
    )
    .unwrap()
});
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•▪‣◦·]|\d+[.)])\s+(.+)$").unwrap());
static SECTION_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:experience|work\s+experience|professional\s+experience|employment|education|projects|certifications|awards|publications|summary|profile|contact)\s*:?\s*$",
    )
    .unwrap()
});
static SKILL_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;|•·]").unwrap());
static TITLE_AT_COMPANY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(?:at|@|[-–|,])\s+(.+)$").unwrap());

const MAX_SKILL_LEN: usize = 40;
const MAX_SKILL_WORDS: usize = 4;

/// Guesses the candidate's name from the top of the document: a short line of
/// 2–4 capitalised words that is not an email or phone number.
pub fn guess_name(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut candidate_lines: Vec<&str> = lines.iter().take(30).copied().collect();

    let keywords = ["email", "phone", "contact", "mobile", "tel"];
    for i in 1..lines.len().min(50) {
        let lower = lines[i].to_lowercase();
        if keywords.iter().any(|k| lower.contains(k)) {
            candidate_lines.push(lines[i - 1]);
        }
    }

    for raw in candidate_lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.contains('@') || line.len() > 50 || NAME_STARTS_WITH_PHONE_RE.is_match(line) {
            continue;
        }
        if SKILLS_HEADER_RE.is_match(line) || SECTION_HEADER_RE.is_match(line) {
            continue;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() < 2 || words.len() > 4 {
            continue;
        }

        if words.iter().all(|w| {
            w.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
                && w.chars().all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '.'))
        }) {
            return Some(line.to_string());
        }
    }

    None
}

/// Collects skills listed under a "Skills" style header, either inline after the
/// colon or on the following lines up to the next blank line or section header.
pub fn extract_skills(text: &str) -> BTreeSet<String> {
    let mut skills = BTreeSet::new();
    let mut in_section = false;

    for line in text.lines() {
        if let Some(caps) = SKILLS_HEADER_RE.captures(line) {
            in_section = true;
            if let Some(inline) = caps.get(1) {
                push_skills(&mut skills, inline.as_str());
            }
            continue;
        }
        if !in_section {
            continue;
        }
        if line.trim().is_empty() || SECTION_HEADER_RE.is_match(line) {
            in_section = false;
            continue;
        }
        let content = BULLET_RE
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(line);
        push_skills(&mut skills, content);
    }

    skills
}

fn push_skills(skills: &mut BTreeSet<String>, fragment: &str) {
    for item in SKILL_SPLIT_RE.split(fragment) {
        let item = item.trim().trim_matches(|c: char| c == '.' || c == ':');
        if item.is_empty()
            || item.len() > MAX_SKILL_LEN
            || item.split_whitespace().count() > MAX_SKILL_WORDS
        {
            continue;
        }
        skills.insert(item.to_lowercase());
    }
}

/// Groups bullet lines under the closest preceding non-bullet line.
/// Bullets in the skills section are skipped.
pub fn extract_experience(text: &str) -> Vec<ExperienceEntry> {
    let mut entries: Vec<ExperienceEntry> = Vec::new();
    let mut heading: Option<&str> = None;
    let mut heading_used = false;
    let mut in_skills = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if SKILLS_HEADER_RE.is_match(trimmed) {
            in_skills = true;
            continue;
        }
        if SECTION_HEADER_RE.is_match(trimmed) {
            in_skills = false;
            heading = None;
            continue;
        }

        match BULLET_RE.captures(trimmed).and_then(|c| c.get(1)) {
            Some(bullet) if !in_skills => {
                if !heading_used || entries.is_empty() {
                    entries.push(entry_from_heading(heading.unwrap_or("Experience")));
                    heading_used = true;
                }
                if let Some(entry) = entries.last_mut() {
                    entry.bullets.push(bullet.as_str().trim().to_string());
                }
            }
            Some(_) => {}
            None => {
                in_skills = false;
                heading = Some(trimmed);
                heading_used = false;
            }
        }
    }

    entries
}

fn entry_from_heading(heading: &str) -> ExperienceEntry {
    match TITLE_AT_COMPANY_RE.captures(heading) {
        Some(caps) => ExperienceEntry {
            title: caps[1].trim().to_string(),
            company: Some(caps[2].trim().to_string()),
            ..Default::default()
        },
        None => ExperienceEntry {
            title: heading.to_string(),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Q Doe\n\
        jane@example.com | +1 555 0100\n\
        \n\
        Technical Skills: Rust, PostgreSQL; Kubernetes | gRPC\n\
        Distributed Systems\n\
        \n\
        Experience\n\
        Senior Engineer at Acme Corp\n\
        - Cut p99 latency by 40% across 3 services\n\
        - Mentored engineers\n\
        Engineer - Initech\n\
        • Built billing pipeline processing 2M events/day\n";

    #[test]
    fn test_guess_name_from_first_line() {
        assert_eq!(guess_name(RESUME).as_deref(), Some("Jane Q Doe"));
    }

    #[test]
    fn test_guess_name_skips_email_and_long_lines() {
        let text = "john@example.com\nThis line is definitely far too long to be a person name at all\nJohn Smith\n";
        assert_eq!(guess_name(text).as_deref(), Some("John Smith"));
    }

    #[test]
    fn test_guess_name_none_for_lowercase_text() {
        assert!(guess_name("some lowercase words\nmore words here").is_none());
    }

    #[test]
    fn test_extract_skills_inline_and_continuation() {
        let skills = extract_skills(RESUME);
        assert!(skills.contains("rust"));
        assert!(skills.contains("postgresql"));
        assert!(skills.contains("kubernetes"));
        assert!(skills.contains("grpc"));
        assert!(skills.contains("distributed systems"));
        assert!(!skills.contains("experience"));
    }

    #[test]
    fn test_extract_skills_empty_without_header() {
        assert!(extract_skills("Jane Doe\n- did things").is_empty());
    }

    #[test]
    fn test_extract_experience_groups_bullets_by_heading() {
        let entries = extract_experience(RESUME);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Senior Engineer");
        assert_eq!(entries[0].company.as_deref(), Some("Acme Corp"));
        assert_eq!(entries[0].bullets.len(), 2);
        assert_eq!(entries[1].title, "Engineer");
        assert_eq!(entries[1].company.as_deref(), Some("Initech"));
        assert_eq!(
            entries[1].bullets,
            vec!["Built billing pipeline processing 2M events/day".to_string()]
        );
    }

    #[test]
    fn test_extract_experience_without_heading_uses_default_title() {
        let entries = extract_experience("- Shipped a thing\n- Shipped another");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Experience");
        assert_eq!(entries[0].bullets.len(), 2);
    }
}
