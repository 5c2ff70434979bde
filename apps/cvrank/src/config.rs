use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::ranking::RankingSettings;
use crate::scoring::heuristic::HeuristicWeights;

pub const DEFAULT_MODEL: &str = "gemma:2b";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_ENGINE: &str = "heuristic";

/// Application configuration loaded from environment variables.
/// Every value has a documented default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub ollama_url: String,
    pub engine: String,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub retries: u32,
    pub rubric_weight: f64,
    pub top_k: usize,
    pub out_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            model: env_or("CVRANK_MODEL", DEFAULT_MODEL),
            ollama_url: env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            engine: env_or("CVRANK_ENGINE", DEFAULT_ENGINE),
            concurrency: parse_env("CVRANK_CONCURRENCY", 2)?,
            timeout_secs: parse_env("CVRANK_TIMEOUT_SECS", 120)?,
            retries: parse_env("CVRANK_RETRIES", 1)?,
            rubric_weight: parse_env("CVRANK_RUBRIC_WEIGHT", 0.7)?,
            top_k: parse_env("CVRANK_TOP_K", 5)?,
            out_dir: PathBuf::from(env_or("CVRANK_OUT_DIR", "out/rankings")),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("CVRANK_CONCURRENCY must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.rubric_weight) {
            anyhow::bail!(
                "CVRANK_RUBRIC_WEIGHT must be within [0, 1], got {}",
                self.rubric_weight
            );
        }
        Ok(())
    }

    /// Orchestrator settings derived from this config.
    pub fn ranking_settings(&self) -> RankingSettings {
        RankingSettings {
            concurrency: self.concurrency.max(1),
            timeout: Duration::from_secs(self.timeout_secs),
            retries: self.retries,
            retry_backoff: Duration::from_millis(500),
            rubric_weight: self.rubric_weight,
            heuristic_weights: HeuristicWeights::default(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        _ => Ok(default),
    }
}
