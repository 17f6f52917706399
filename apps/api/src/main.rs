mod analysis;
mod config;
mod errors;
mod extract;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::orchestrator::Analyzer;
use crate::analysis::prompts::ANALYSIS_SYSTEM;
use crate::analysis::registry::SessionRegistry;
use crate::config::Config;
use crate::extract::PdfTextExtractor;
use crate::llm_client::{CompletionClient, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::build_record_store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; only malformed values are fatal here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client. A missing key disables analysis, not the service.
    let completion: Option<Arc<dyn CompletionClient>> =
        match LlmClient::from_config(&config.completion, ANALYSIS_SYSTEM) {
            Ok(client) => {
                info!("LLM client initialized (model: {})", client.model());
                Some(Arc::new(client))
            }
            Err(e) => {
                error!("Analysis disabled: {e}");
                None
            }
        };

    // Initialize DynamoDB record store
    let store = build_record_store(&config.store).await;

    let analyzer = Analyzer::new(completion, store, config.analysis_delay);

    // Build app state
    let state = AppState {
        extractor: Arc::new(PdfTextExtractor),
        analyzer: Arc::new(analyzer),
        sessions: SessionRegistry::default(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
