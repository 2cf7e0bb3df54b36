mod clients;
mod config;
mod error;
mod queue;
mod routes;
mod runner;
mod session_io;
mod stages;
mod state;
mod store;

use std::sync::Arc;

use tracing::info;

use config::Config;
use queue::JobQueue;
use state::PipelineState;
use store::JobStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(bind_addr = %config.bind_addr, max_concurrent_jobs = config.max_concurrent_jobs, "starting pipeline runner");

    let store = JobStore::open(&config.jobs_db_path)?;
    let runner = runner::build_runner(config.clone(), store.clone());
    let (queue, _dispatcher_handle) = JobQueue::spawn(config.max_concurrent_jobs, store.clone(), runner);

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(PipelineState { config, store, queue: queue.clone() });

    let app = routes::router(state).layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind_addr = %bind_addr, "pipeline listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(queue))
        .await?;

    Ok(())
}

async fn shutdown_signal(queue: Arc<JobQueue>) {
    tokio::signal::ctrl_c().await.ok();
    info!("shutdown signal received, draining job queue");
    queue.shutdown();
}
