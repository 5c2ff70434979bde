//! Keyword coverage shared by every scoring engine.
//!
//! Normalisation (applied to both sides before comparing):
//! 1. lowercase;
//! 2. `-`, `_`, `/` and whitespace runs become a single space;
//! 3. surrounding punctuation other than `+` and `#` is trimmed from each word;
//! 4. each word is singularised: `ies` → `y` for words longer than 4 chars,
//!    otherwise a trailing `s` is dropped for words longer than 3 chars that do
//!    not end in `ss`, `us` or `is`.
//!
//! Multi-word keywords match word n-grams (n ≤ 3) of free text.

use std::collections::BTreeSet;

use crate::generation::tailor::TailoredContent;
use crate::models::resume::ResumeRecord;

const MAX_NGRAM: usize = 3;

/// Canonical form of a keyword or phrase. Returns an empty string when nothing
/// meaningful remains.
pub fn normalize_keyword(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    lowered
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '/'))
        .map(trim_word)
        .filter(|w| !w.is_empty())
        .map(singularize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn trim_word(word: &str) -> &str {
    word.trim_matches(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
}

fn singularize(word: &str) -> String {
    let len = word.chars().count();
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if len > 3
        && word.ends_with('s')
        && !(word.ends_with("ss") || word.ends_with("us") || word.ends_with("is"))
    {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Normalised word n-grams (n ≤ 3) of free text.
pub fn text_terms(text: &str) -> BTreeSet<String> {
    let words: Vec<String> = normalize_keyword(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();

    let mut terms = BTreeSet::new();
    for n in 1..=MAX_NGRAM {
        for window in words.windows(n) {
            terms.insert(window.join(" "));
        }
    }
    terms
}

/// Candidate keyword set for a resume: extracted skills, experience
/// technologies and the n-grams of the tailored text.
pub fn candidate_keywords(resume: &ResumeRecord, tailored: &TailoredContent<'_>) -> BTreeSet<String> {
    let mut keywords: BTreeSet<String> = resume
        .extracted_skills
        .iter()
        .map(String::as_str)
        .chain(resume.all_technologies())
        .map(normalize_keyword)
        .filter(|k| !k.is_empty())
        .collect();
    keywords.extend(text_terms(&tailored.tailored_text));
    keywords
}

/// |candidate ∩ required| / |required| over normalised keywords.
///
/// Returns 0.0 when `required` is empty (or normalises to nothing).
pub fn keyword_coverage<C, R>(candidate: C, required: R) -> f64
where
    C: IntoIterator,
    C::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let required: BTreeSet<String> = required
        .into_iter()
        .map(|k| normalize_keyword(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect();
    if required.is_empty() {
        return 0.0;
    }

    let candidate: BTreeSet<String> = candidate
        .into_iter()
        .map(|k| normalize_keyword(k.as_ref()))
        .collect();

    let covered = required.iter().filter(|k| candidate.contains(*k)).count();
    covered as f64 / required.len() as f64
}
