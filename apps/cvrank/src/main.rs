mod cli;
mod config;
mod errors;
mod extraction;
mod generation;
mod llm_client;
mod models;
mod ranking;
mod routes;
mod scoring;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::llm_client::{CompletionService, OllamaClient};
use crate::ranking::Ranker;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Initialize completion service client
    let ollama = OllamaClient::new(config.ollama_url.clone());
    info!(
        "Completion service: {} (default model: {})",
        ollama.base_url(),
        config.model
    );
    let llm: Arc<dyn CompletionService> = Arc::new(ollama);

    match cli.command {
        Commands::Rank(args) => cli::run_rank(args, &config, llm).await,
        Commands::Serve { port } => serve(config, llm, port).await,
    }
}

async fn serve(config: Config, llm: Arc<dyn CompletionService>, port: Option<u16>) -> Result<()> {
    info!("Starting cvrank API v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState {
        ranker: Ranker::new(llm, config.ranking_settings()),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", port.unwrap_or(config.port)).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
