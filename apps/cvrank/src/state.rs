use crate::config::Config;
use crate::ranking::Ranker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator holding the completion service and ranking settings.
    pub ranker: Ranker,
    pub config: Config,
}
