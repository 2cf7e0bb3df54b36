//! `GET /models` — supplemented endpoint, see SPEC_FULL.md §5: lists cached
//! model ids per backend plus their current load state.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use whisper_common::TranscriptionProfile;

use crate::state::AppState;

#[derive(Serialize)]
struct ModelEntry {
    model_id: String,
    backend: String,
    state: String,
}

fn state_label(s: asr_engine::ModelState) -> &'static str {
    match s {
        asr_engine::ModelState::Absent => "absent",
        asr_engine::ModelState::Loading => "loading",
        asr_engine::ModelState::Ready => "ready",
    }
}

pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut entries = Vec::new();
    for profile in [
        TranscriptionProfile::UltraRealtime,
        TranscriptionProfile::Fast,
        TranscriptionProfile::Accurate,
        TranscriptionProfile::HighestQuality,
    ] {
        let spec = profile.spec();
        let backend = state.resolve_backend(profile);
        let model_state = state.model_state(backend, spec.model_id).await;
        entries.push(ModelEntry {
            model_id: spec.model_id.to_string(),
            backend: backend.to_string(),
            state: state_label(model_state).to_string(),
        });
    }
    Json(serde_json::json!({
        "models": entries,
        "accelerator_available": state.accelerator_available(),
    }))
}

