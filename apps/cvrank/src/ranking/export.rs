//! Report exports: JSON array, CSV and a console top-K summary.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::report::{RankingReport, ScoreResult};

const CSV_HEADER: [&str; 6] = [
    "rank",
    "name",
    "resume_path",
    "alignment_score",
    "keyword_coverage",
    "error",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    name: &'a str,
    resume_path: String,
    alignment_score: f64,
    keyword_coverage: f64,
    error: String,
}

impl<'a> From<&'a ScoreResult> for CsvRow<'a> {
    fn from(result: &'a ScoreResult) -> Self {
        CsvRow {
            rank: result.rank,
            name: result.name.as_deref().unwrap_or(""),
            resume_path: result.resume_path.display().to_string(),
            alignment_score: result.alignment_score,
            keyword_coverage: result.keyword_coverage,
            error: result
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

/// Candidates as a pretty-printed JSON array in rank order.
pub fn to_json(candidates: &[ScoreResult]) -> Result<String> {
    serde_json::to_string_pretty(candidates).context("Failed to serialize ranking to JSON")
}

/// Candidates as CSV with a header row, in rank order.
pub fn to_csv(candidates: &[ScoreResult]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    // Written explicitly so an empty ranking still carries the header.
    writer.write_record(CSV_HEADER)?;
    for result in candidates {
        writer.serialize(CsvRow::from(result))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {e}"))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

pub async fn write_json(path: &Path, candidates: &[ScoreResult]) -> Result<()> {
    write_file(path, to_json(candidates)?).await
}

pub async fn write_csv(path: &Path, candidates: &[ScoreResult]) -> Result<()> {
    write_file(path, to_csv(candidates)?).await
}

async fn write_file(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Top-K summary, one line per candidate plus an indented tips line.
pub fn console_summary(report: &RankingReport, top_k: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Top {} of {} candidate(s) for {} [{} / {}]",
        top_k.min(report.len()),
        report.len(),
        report.job_title.as_deref().unwrap_or("the role"),
        report.engine,
        report.model
    );

    for result in report.candidates.iter().take(top_k) {
        let _ = write!(
            out,
            "#{}: {} | Align={:.3} | Cover={:.3} | {}",
            result.rank,
            result.display_name(),
            result.alignment_score,
            result.keyword_coverage,
            result.resume_path.display()
        );
        if let Some(error) = &result.error {
            let _ = write!(out, " | ERROR {error}");
        }
        out.push('\n');
        if let Some(explanation) = &result.explanation {
            let _ = writeln!(out, "    tips: {explanation}");
        }
    }
    out
}
