//! Gita Guide - conversational Bhagavad Gita guide
//!
//! Relays seeker questions to a locally hosted Ollama model and renders the
//! guide's replies with verse styling.

mod api;
mod config;
mod format;
mod llm;
mod prompt;
mod render;
mod session;

use api::{create_router, AppState};
use config::GuideConfig;
use llm::OllamaConnector;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gita_guide=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = GuideConfig::from_env();
    tracing::info!(
        model = %config.model,
        base_url = %config.ollama_base_url,
        temperature = config.temperature,
        max_tokens = config.max_tokens,
        session_ttl_secs = config.session_ttl.as_secs(),
        "Guide configured"
    );

    // Create application state
    let state = AppState::new(Arc::new(OllamaConnector), &config);
    state
        .sessions
        .start_idle_sweeper(config.session_ttl, config.sweep_interval());

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Gita Guide listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
