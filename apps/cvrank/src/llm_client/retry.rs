//! Caller-side retry for completion calls.
//!
//! `CompletionService` implementations never retry. Pipeline stages go through
//! `complete_with_retry` so the policy lives in one place and is configured by
//! the orchestrator.

use std::time::Duration;

use tracing::warn;

use super::{CompletionError, CompletionService};

/// Per-call parameters threaded from configuration into every stage.
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub model: String,
    pub timeout: Duration,
    pub retries: u32,
    pub backoff: Duration,
}

impl CallOptions {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            model: model.into(),
            timeout,
            retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Calls the service, retrying transient failures with exponential backoff
/// (backoff, 2×backoff, 4×backoff, ...).
pub async fn complete_with_retry(
    llm: &dyn CompletionService,
    prompt: &str,
    options: &CallOptions,
) -> Result<String, CompletionError> {
    let mut attempt = 0;
    loop {
        match llm.complete(prompt, &options.model, options.timeout).await {
            Ok(text) => return Ok(text),
            Err(e) if e.is_transient() && attempt < options.retries => {
                let delay = options.backoff * (1 << attempt.min(16));
                attempt += 1;
                warn!(
                    "Completion attempt {}/{} failed ({e}), retrying after {}ms...",
                    attempt,
                    options.retries + 1,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
