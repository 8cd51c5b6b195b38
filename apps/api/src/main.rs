mod config;
mod errors;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod report;
mod routes;
mod scout;
mod sources;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ScorerBackend};
use crate::llm_client::LlmClient;
use crate::matching::fit_scoring::{KeywordMatchScorer, LlmMatchScorer, MatchScorer};
use crate::pipeline::run::PipelineContext;
use crate::routes::build_router;
use crate::sources::build_sources;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ScoutHire API v{}", env!("CARGO_PKG_VERSION"));

    // Job sources share one HTTP client
    let http = sources::http::build_client().context("Failed to build job source HTTP client")?;
    let sources = build_sources(&config.sources, http)?;
    info!(
        "Job sources: {}",
        sources
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let scorer: Arc<dyn MatchScorer> = match config.resolved_backend()? {
        ScorerBackend::Llm => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .context("ANTHROPIC_API_KEY is required for the LLM scorer")?;
            let llm = LlmClient::new(api_key).context("Failed to build LLM client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmMatchScorer(llm))
        }
        _ => Arc::new(KeywordMatchScorer),
    };
    info!("Match scorer: {}", scorer.backend());

    let state = AppState {
        pipeline: PipelineContext {
            sources,
            scorer,
            settings: config.pipeline_settings(),
        },
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
