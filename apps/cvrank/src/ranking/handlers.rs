//! Axum route handlers for the Rankings API.

use std::collections::HashSet;
use std::path::{Path as FsPath, PathBuf};

use anyhow::Context;
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::jd_parser::JobSource;
use crate::ranking::export::to_csv;
use crate::ranking::{RankRequest, RankingReport, ScoreResult};
use crate::scoring::EngineChoice;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Fields collected from the multipart form.
#[derive(Debug, Default)]
struct RankingForm {
    resumes: Vec<PathBuf>,
    jd_text: Option<String>,
    jd_file: Option<PathBuf>,
    model: Option<String>,
    engine: Option<String>,
    filters: ResponseFilters,
}

/// Shape the response only; the stored report is always complete.
#[derive(Debug, Default)]
struct ResponseFilters {
    min_alignment: Option<f64>,
    top_n: Option<usize>,
    /// Lowercased tokens that must all appear in a candidate's name,
    /// explanation or per-requirement text.
    required_skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub ranking_id: Uuid,
    pub engine: EngineChoice,
    pub model: String,
    pub job_title: Option<String>,
    /// Candidates in the full report, before response filters.
    pub total: usize,
    pub failed: usize,
    pub candidates: Vec<ScoreResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rankings
///
/// Multipart form: `resumes` (one or more files), `jd_text` or `jd_file`,
/// optional `model`, `engine`, `min_alignment`, `top_n`, `required_skills`
/// (comma-separated).
/// The complete report is persisted; filters only shape this response.
pub async fn handle_create_ranking(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RankingResponse>, AppError> {
    let upload_dir = tempfile::tempdir().context("Failed to create upload directory")?;
    let form = read_form(multipart, upload_dir.path()).await?;

    if form.resumes.is_empty() {
        return Err(AppError::Validation(
            "at least one 'resumes' file is required".to_string(),
        ));
    }
    let job = match (form.jd_file, form.jd_text) {
        (Some(path), _) => JobSource::Path(path),
        (None, Some(text)) => JobSource::Text(text),
        (None, None) => {
            return Err(AppError::Validation(
                "either 'jd_text' or 'jd_file' is required".to_string(),
            ))
        }
    };

    let request = RankRequest {
        resume_patterns: form
            .resumes
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        job,
        engine: form.engine.unwrap_or_else(|| state.config.engine.clone()),
        model: form.model.unwrap_or_else(|| state.config.model.clone()),
    };

    let mut report = state.ranker.rank(&request).await?;
    relativize_paths(&mut report, upload_dir.path());

    let ranking_id = Uuid::new_v4();
    save_report(&state.config.out_dir, ranking_id, &report).await?;
    info!(
        "Ranking {ranking_id} stored: {} candidate(s), {} failed",
        report.len(),
        report.failed_count()
    );

    let total = report.len();
    let failed = report.failed_count();
    let candidates = apply_filters(report.candidates, &form.filters);

    Ok(Json(RankingResponse {
        ranking_id,
        engine: report.engine,
        model: report.model,
        job_title: report.job_title,
        total,
        failed,
        candidates,
    }))
}

/// GET /api/v1/rankings/:id
pub async fn handle_get_ranking(
    State(state): State<AppState>,
    Path(ranking_id): Path<Uuid>,
) -> Result<Json<RankingReport>, AppError> {
    let report = load_report(&state.config.out_dir, ranking_id).await?;
    Ok(Json(report))
}

/// GET /api/v1/rankings/:id/csv
pub async fn handle_get_ranking_csv(
    State(state): State<AppState>,
    Path(ranking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let report = load_report(&state.config.out_dir, ranking_id).await?;
    let body = to_csv(&report.candidates)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"ranking-{ranking_id}.csv\""),
            ),
        ],
        body,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_form(mut multipart: Multipart, dir: &FsPath) -> Result<RankingForm, AppError> {
    let mut form = RankingForm::default();
    let mut used_names = HashSet::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resumes" | "jd_file" => {
                // Browsers send an unselected file input as a part with an
                // empty file name.
                let raw_name = field.file_name().unwrap_or_default().to_string();
                if raw_name.trim().is_empty() {
                    continue;
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read '{name}': {e}")))?;
                // An empty resume is still staged so it is reported as failed.
                // An empty JD file falls back to `jd_text`.
                if name == "jd_file" && data.is_empty() {
                    continue;
                }
                let file_name = unique_name(&mut used_names, raw_name);
                let path = dir.join(&file_name);
                tokio::fs::write(&path, &data)
                    .await
                    .with_context(|| format!("Failed to stage upload {file_name}"))?;
                if name == "resumes" {
                    form.resumes.push(path);
                } else {
                    form.jd_file = Some(path);
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read '{name}': {e}")))?;
                let value = value.trim().to_string();
                if value.is_empty() {
                    continue;
                }
                match name.as_str() {
                    "jd_text" => form.jd_text = Some(value),
                    "model" => form.model = Some(value),
                    "engine" => form.engine = Some(value),
                    "min_alignment" => {
                        form.filters.min_alignment = Some(parse_field(&name, &value)?)
                    }
                    "top_n" => form.filters.top_n = Some(parse_field(&name, &value)?),
                    "required_skills" => form.filters.required_skills = skill_tokens(&value),
                    _ => {}
                }
            }
        }
    }
    Ok(form)
}

fn parse_field<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::Validation(format!("'{name}' has an invalid value: {value}")))
}

/// Keeps only the final path component and makes it unique within one upload.
/// Commas and glob metacharacters are replaced so the staged path expands to
/// exactly itself.
fn unique_name(used: &mut HashSet<String>, raw: String) -> String {
    let base = FsPath::new(&raw)
        .file_name()
        .map(|n| n.to_string_lossy().replace([',', '*', '?', '[', ']'], "_"))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "upload".to_string());

    let mut candidate = base.clone();
    let mut counter = 1;
    while !used.insert(candidate.clone()) {
        candidate = format!("{counter}-{base}");
        counter += 1;
    }
    candidate
}

/// Reports refer to uploads by their file name, not the staging path.
fn relativize_paths(report: &mut RankingReport, dir: &FsPath) {
    for candidate in &mut report.candidates {
        if let Ok(relative) = candidate.resume_path.strip_prefix(dir) {
            candidate.resume_path = relative.to_path_buf();
        }
    }
}

fn skill_tokens(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn mentions_all_skills(candidate: &ScoreResult, skills: &[String]) -> bool {
    if skills.is_empty() {
        return true;
    }
    let mut haystack = candidate.name.clone().unwrap_or_default();
    if let Some(explanation) = &candidate.explanation {
        haystack.push('\n');
        haystack.push_str(explanation);
    }
    for item in &candidate.per_requirement {
        haystack.push('\n');
        haystack.push_str(&item.requirement);
        haystack.push('\n');
        haystack.push_str(&item.explanation);
    }
    let haystack = haystack.to_lowercase();
    skills.iter().all(|skill| haystack.contains(skill.as_str()))
}

/// min_alignment and required_skills first, then top_n.
fn apply_filters(candidates: Vec<ScoreResult>, filters: &ResponseFilters) -> Vec<ScoreResult> {
    candidates
        .into_iter()
        .filter(|c| filters.min_alignment.map_or(true, |min| c.alignment_score >= min))
        .filter(|c| mentions_all_skills(c, &filters.required_skills))
        .take(filters.top_n.unwrap_or(usize::MAX))
        .collect()
}

fn report_path(out_dir: &FsPath, ranking_id: Uuid) -> PathBuf {
    out_dir.join(format!("{ranking_id}.json"))
}

async fn save_report(
    out_dir: &FsPath,
    ranking_id: Uuid,
    report: &RankingReport,
) -> Result<(), AppError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let json = serde_json::to_vec_pretty(report).context("Failed to serialize ranking")?;
    tokio::fs::write(report_path(out_dir, ranking_id), json)
        .await
        .context("Failed to persist ranking")?;
    Ok(())
}

async fn load_report(out_dir: &FsPath, ranking_id: Uuid) -> Result<RankingReport, AppError> {
    let path = report_path(out_dir, ranking_id);
    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("Ranking {ranking_id} not found")))
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Failed to read ranking").into()),
    };
    let report = serde_json::from_slice(&data).context("Stored ranking is corrupt")?;
    Ok(report)
}
