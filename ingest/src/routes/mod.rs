pub mod ingest;
pub mod interpret;
pub mod jobs;
pub mod realtime;
pub mod sessions;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::IngestState;

pub fn router(state: Arc<IngestState>) -> Router {
    Router::new()
        .route("/api/ingest", post(ingest::ingest))
        .route("/api/interpret/:session_id", post(interpret::interpret))
        .route("/api/sessions", get(sessions::list))
        .route("/api/sessions/:session_id", get(sessions::detail))
        .route("/api/sessions/:session_id/audio", get(sessions::audio))
        .route("/api/sessions/:session_id/interpretations", get(interpret::list_interpretations))
        .route("/api/jobs/:id", get(jobs::get_status))
        .route("/api/jobs/:id/result", get(jobs::get_result))
        .route("/ws/transcribe", get(realtime::ws_ingest))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
