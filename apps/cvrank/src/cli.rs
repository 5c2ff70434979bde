//! Command-line surface.
//!
//! - `rank`: rank resumes against one job description and print a summary
//! - `serve`: start the HTTP API
//!
//! Flags override the environment configuration for a single run.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::generation::jd_parser::JobSource;
use crate::llm_client::CompletionService;
use crate::ranking::export::{console_summary, write_csv, write_json};
use crate::ranking::{RankRequest, Ranker};

#[derive(Parser)]
#[command(name = "cvrank")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rank resumes against a job description with a local model", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank resumes against a job description
    Rank(RankArgs),

    /// Start the HTTP API
    Serve {
        /// Port to listen on (default: PORT or 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Resume paths or globs; comma-separated values are accepted
    #[arg(short, long, required = true, num_args = 1..)]
    pub resumes: Vec<String>,

    /// Job description file (.txt, .md, .pdf or .docx)
    #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
    pub job: Option<PathBuf>,

    /// Job description as inline text
    #[arg(long)]
    pub job_text: Option<String>,

    /// Scoring engine: heuristic or resume_matcher (default: CVRANK_ENGINE)
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Model name (default: CVRANK_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Write the ranking as a JSON array to this path
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write the ranking as CSV to this path
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Candidates shown in the console summary (default: CVRANK_TOP_K)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Resumes processed at once (default: CVRANK_CONCURRENCY)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,
}

impl RankArgs {
    fn job_source(&self) -> JobSource {
        match (&self.job, &self.job_text) {
            (Some(path), _) => JobSource::Path(path.clone()),
            (None, text) => JobSource::Text(text.clone().unwrap_or_default()),
        }
    }

    fn request(&self, config: &Config) -> RankRequest {
        RankRequest {
            resume_patterns: self.resumes.clone(),
            job: self.job_source(),
            engine: self.engine.clone().unwrap_or_else(|| config.engine.clone()),
            model: self.model.clone().unwrap_or_else(|| config.model.clone()),
        }
    }
}

/// Runs `cvrank rank`. Output files are written only after a successful
/// ranking.
pub async fn run_rank(
    args: RankArgs,
    config: &Config,
    llm: Arc<dyn CompletionService>,
) -> Result<()> {
    let mut settings = config.ranking_settings();
    if let Some(concurrency) = args.concurrency {
        settings.concurrency = concurrency as usize;
    }

    let ranker = Ranker::new(llm, settings);
    let report = ranker.rank(&args.request(config)).await?;

    if let Some(path) = &args.json {
        write_json(path, &report.candidates).await?;
        info!("Wrote JSON ranking to {}", path.display());
    }
    if let Some(path) = &args.csv {
        write_csv(path, &report.candidates).await?;
        info!("Wrote CSV ranking to {}", path.display());
    }

    print!("{}", console_summary(&report, args.top_k.unwrap_or(config.top_k)));
    Ok(())
}
