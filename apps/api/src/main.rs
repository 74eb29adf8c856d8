mod config;
mod errors;
mod evaluation;
mod history;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluation::prompts::PROMPT_VERSION;
use crate::history::store::HistoryStore;
use crate::llm_client::{ClientCache, ModelSettings};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.rust_log.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting interview evaluation API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize the history store
    let store = HistoryStore::new(config.history_file.clone());
    info!("History store at {}", store.path().display());
    let history = Arc::new(Mutex::new(store));

    // Initialize the LLM client cache with the configured defaults
    let llm = Arc::new(ClientCache::new(
        config.anthropic_api_key.clone(),
        ModelSettings {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
        },
    ));
    info!(
        "LLM client initialized (model: {}, temperature: {}, prompt template {})",
        config.llm_model, config.llm_temperature, PROMPT_VERSION
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        history,
        llm,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
