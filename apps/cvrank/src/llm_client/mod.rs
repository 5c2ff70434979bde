//! LLM Client: the single point of entry for local model calls in cvrank.
//!
//! ARCHITECTURAL RULE: extraction, tailoring and scoring depend on the
//! `CompletionService` trait, never on `OllamaClient` directly.
//!
//! The adapter is stateless and does not retry. Retry policy belongs to callers
//! (see `retry::complete_with_retry`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;
pub mod retry;

pub use retry::{complete_with_retry, CallOptions};

const GENERATE_PATH: &str = "/api/generate";
const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("completion timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("completion API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion returned empty content")]
    EmptyContent,
}

impl CompletionError {
    /// Transient failures are worth a caller-side retry; a missing model is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::ServiceUnavailable(_) | CompletionError::Timeout(_)
        ) || matches!(self, CompletionError::Api { status, .. } if *status >= 500)
    }
}

/// Prompt in, raw text out.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Client for a locally hosted Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CompletionService for OllamaClient {
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<String, CompletionError> {
        let request_body = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(format!("{}{GENERATE_PATH}", self.base_url))
            .timeout(timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            if status == StatusCode::NOT_FOUND {
                return Err(CompletionError::ModelNotFound(format!("{model}: {message}")));
            }
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        debug!(
            "Completion succeeded: model={}, prompt_tokens={:?}, output_tokens={:?}",
            model, body.prompt_eval_count, body.eval_count
        );

        let text = body.response.trim();
        if text.is_empty() {
            return Err(CompletionError::EmptyContent);
        }
        Ok(text.to_string())
    }
}

fn map_transport_error(e: reqwest::Error, timeout: Duration) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout(timeout)
    } else {
        CompletionError::ServiceUnavailable(e.to_string())
    }
}

/// Locates the JSON object in model output and deserializes it.
/// Handles ```json fences and prose around the object. Returns `None` when no
/// object parses; callers decide the fallback.
pub fn parse_json_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    let text = strip_json_fences(text);
    if let Ok(value) = serde_json::from_str::<T>(text) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
pub mod testing {
    //! Deterministic stand-in for the local model.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    type Rule = (String, Result<String, fn() -> CompletionError>);

    /// Replies are chosen by the first rule whose marker occurs in the prompt.
    /// Prompts matching no rule get `default_reply`.
    #[derive(Default)]
    pub struct StubCompletion {
        rules: Vec<Rule>,
        default_reply: String,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl StubCompletion {
        pub fn new(default_reply: &str) -> Self {
            Self {
                default_reply: default_reply.to_string(),
                ..Default::default()
            }
        }

        pub fn reply_when(mut self, marker: &str, reply: &str) -> Self {
            self.rules.push((marker.to_string(), Ok(reply.to_string())));
            self
        }

        pub fn fail_when(mut self, marker: &str, error: fn() -> CompletionError) -> Self {
            self.rules.push((marker.to_string(), Err(error)));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Every prompt received so far that contains `marker`.
        pub fn prompts_with(&self, marker: &str) -> Vec<String> {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.contains(marker))
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl CompletionService for StubCompletion {
        async fn complete(
            &self,
            prompt: &str,
            _model: &str,
            _timeout: Duration,
        ) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            for (marker, reply) in &self.rules {
                if prompt.contains(marker.as_str()) {
                    return match reply {
                        Ok(text) => Ok(text.clone()),
                        Err(make_error) => Err(make_error()),
                    };
                }
            }
            Ok(self.default_reply.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        key: String,
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_object_inside_prose() {
        let input = "Sure! Here is the result: {\"key\": \"value\"} Hope this helps.";
        let payload: Payload = parse_json_object(input).unwrap();
        assert_eq!(payload.key, "value");
    }

    #[test]
    fn test_parse_json_object_returns_none_for_plain_text() {
        assert!(parse_json_object::<Payload>("no json here").is_none());
        assert!(parse_json_object::<Payload>("} backwards {").is_none());
    }

    #[test]
    fn test_transient_classification() {
        assert!(CompletionError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(CompletionError::ServiceUnavailable("down".into()).is_transient());
        assert!(CompletionError::Api {
            status: 503,
            message: "busy".into()
        }
        .is_transient());
        assert!(!CompletionError::ModelNotFound("x".into()).is_transient());
        assert!(!CompletionError::EmptyContent.is_transient());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/");
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_service_unavailable() {
        // Port 9 (discard) is not an HTTP server on test machines.
        let client = OllamaClient::new("http://127.0.0.1:9");
        let err = client
            .complete("hello", "gemma:2b", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CompletionError::ServiceUnavailable(_) | CompletionError::Timeout(_)
        ));
    }
}
