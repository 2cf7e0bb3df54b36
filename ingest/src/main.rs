mod audio_tool;
mod config;
mod error;
mod finalize;
mod gateway_client;
mod noise;
mod pipeline_client;
mod routes;
mod session_store;
mod state;

use std::sync::Arc;

use tracing::info;

use config::Config;
use state::IngestState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(bind_addr = %config.bind_addr, sessions_dir = %config.sessions_dir.display(), "starting ingest orchestrator");

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(IngestState::new(config));

    let app = routes::router(state).layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind_addr = %bind_addr, "ingest listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("shutdown signal received");
}
