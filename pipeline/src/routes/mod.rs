pub mod contexts;
pub mod jobs;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::PipelineState;

pub fn router(state: Arc<PipelineState>) -> Router {
    Router::new()
        .route("/jobs", post(jobs::submit))
        .route("/jobs/:id", get(jobs::get_status))
        .route("/jobs/:id/result", get(jobs::get_result))
        .route("/api/contexts", get(contexts::list))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
