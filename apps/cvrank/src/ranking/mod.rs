//! Ranking orchestrator.
//!
//! Pipeline per batch:
//!   engine choice → path expansion → JD parse (once) → per resume:
//!   extract → tailor → score → sort → contiguous ranks
//!
//! The first three steps are fatal and run before any resume is touched.
//! Everything after is per item: a failure becomes a `ScoreResult` with
//! `error` set and the batch carries on.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::extract_resume;
use crate::generation::jd_parser::{parse_jd, JobSource};
use crate::generation::tailor::tailor_resume;
use crate::llm_client::{CallOptions, CompletionService};
use crate::models::job::JobRequirements;
use crate::scoring::heuristic::HeuristicWeights;
use crate::scoring::{EngineChoice, ScoringEngine};

pub mod export;
pub mod handlers;
pub mod paths;
pub mod report;

pub use report::{FailureKind, ItemError, RankingReport, ScoreResult};

/// Orchestrator knobs, threaded in from `Config` or CLI flags.
#[derive(Debug, Clone)]
pub struct RankingSettings {
    /// Resumes processed at once. Each item makes its completion calls one
    /// after another, so this also bounds in-flight completions.
    pub concurrency: usize,
    pub timeout: Duration,
    pub retries: u32,
    pub retry_backoff: Duration,
    pub rubric_weight: f64,
    pub heuristic_weights: HeuristicWeights,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            concurrency: 2,
            timeout: Duration::from_secs(120),
            retries: 1,
            retry_backoff: Duration::from_millis(500),
            rubric_weight: 0.7,
            heuristic_weights: HeuristicWeights::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankRequest {
    /// Paths or globs; each entry may be comma-separated.
    pub resume_patterns: Vec<String>,
    pub job: JobSource,
    pub engine: String,
    pub model: String,
}

#[derive(Clone)]
pub struct Ranker {
    llm: Arc<dyn CompletionService>,
    settings: RankingSettings,
}

impl Ranker {
    pub fn new(llm: Arc<dyn CompletionService>, settings: RankingSettings) -> Self {
        Self { llm, settings }
    }

    /// Ranks every resume in the request against one job description.
    pub async fn rank(&self, request: &RankRequest) -> Result<RankingReport, AppError> {
        let choice: EngineChoice = request.engine.parse()?;

        let paths = paths::expand_resume_paths(&request.resume_patterns);
        if paths.is_empty() {
            return Err(AppError::NoResumesFound(request.resume_patterns.join(", ")));
        }

        let call = CallOptions {
            retries: self.settings.retries,
            backoff: self.settings.retry_backoff,
            ..CallOptions::new(request.model.clone(), self.settings.timeout)
        };

        let job = parse_jd(&request.job, self.llm.as_ref(), &call).await?;
        let engine = choice.build(
            self.llm.clone(),
            call.clone(),
            self.settings.rubric_weight,
            self.settings.heuristic_weights,
        );

        info!(
            "Ranking {} resume(s) with engine={} model={} concurrency={}",
            paths.len(),
            engine.name(),
            call.model,
            self.settings.concurrency
        );

        // Results land in index-addressed slots so completion order never
        // leaks into the report.
        let mut slots: Vec<Option<ScoreResult>> = vec![None; paths.len()];
        let job_ref = &job;
        let engine_ref = engine.as_ref();
        let call_ref = &call;
        let finished: Vec<(usize, ScoreResult)> = stream::iter(paths.into_iter().enumerate())
            .map(|(index, path)| async move {
                let result = self.process_one(&path, job_ref, engine_ref, call_ref).await;
                (index, result)
            })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;
        for (index, result) in finished {
            slots[index] = Some(result);
        }

        let candidates = report::assign_ranks(slots.into_iter().flatten().collect());
        let report = RankingReport {
            engine: choice,
            model: call.model,
            job_title: job.title.clone(),
            job_keywords: job.required_keywords.clone(),
            generated_at: Utc::now(),
            candidates,
        };

        info!(
            "Ranking complete: {} candidate(s), {} failed",
            report.len(),
            report.failed_count()
        );
        Ok(report)
    }

    async fn process_one(
        &self,
        path: &Path,
        job: &JobRequirements,
        engine: &dyn ScoringEngine,
        call: &CallOptions,
    ) -> ScoreResult {
        let llm = self.llm.as_ref();

        let resume = match extract_resume(path, llm, call).await {
            Ok(resume) => resume,
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                return ScoreResult::failed(path.to_path_buf(), None, e.into());
            }
        };

        let tailored = match tailor_resume(&resume, job, llm, call).await {
            Ok(tailored) => tailored,
            Err(e) => {
                warn!("Tailoring failed for {}: {e}", path.display());
                return ScoreResult::failed(
                    path.to_path_buf(),
                    resume.candidate_name.clone(),
                    e.into(),
                );
            }
        };

        match engine.score(&resume, job, &tailored).await {
            Ok(score) => ScoreResult {
                rank: 0,
                name: resume.candidate_name.clone(),
                resume_path: path.to_path_buf(),
                alignment_score: score.alignment_score,
                keyword_coverage: score.keyword_coverage,
                error: None,
                notes: score.notes,
                explanation: score.explanation,
                per_requirement: score.per_requirement,
            },
            Err(e) => {
                warn!("Scoring failed for {}: {e}", path.display());
                ScoreResult::failed(path.to_path_buf(), resume.candidate_name.clone(), e.into())
            }
        }
    }
}
