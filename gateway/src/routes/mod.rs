pub mod health;
pub mod models;
pub mod retry;
pub mod transcribe;
pub mod warmup;
pub mod ws;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe::transcribe))
        .route("/transcribe/retry", post(retry::retry))
        .route("/warmup", post(warmup::warmup))
        .route("/ws/transcribe", get(ws::ws_transcribe))
        .route("/models", get(models::list_models))
        .route("/health", get(health::health))
        .with_state(state)
}

/// Parse a profile query string, falling back to the default profile and
/// logging a warning for unknown values (spec.md §4.1 failure semantics).
pub fn parse_profile_or_default(raw: Option<&str>) -> whisper_common::TranscriptionProfile {
    match raw {
        None => whisper_common::TranscriptionProfile::default(),
        Some(s) => s.parse().unwrap_or_else(|_| {
            tracing::warn!(profile = s, "unknown transcription profile, falling back to default");
            whisper_common::TranscriptionProfile::default()
        }),
    }
}
