//! `POST /api/interpret/{session_id}` and
//! `GET /api/sessions/{session_id}/interpretations` — spec.md §4.3/§6.
//! Re-interpretation: read the raw segments already on disk, submit a new
//! pipeline job with a different context profile, no re-transcription.
//! Grounded on `original_source/backend/routers/interpret.py`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IngestError;
use crate::session_store;
use crate::state::IngestState;

#[derive(Debug, Deserialize)]
pub struct InterpretQuery {
    pub context: String,
}

#[derive(Debug, Serialize)]
pub struct InterpretResponse {
    pub session_id: String,
    pub context: String,
    pub job_id: String,
    pub poll_url: String,
}

pub async fn interpret(
    State(state): State<Arc<IngestState>>,
    Path(session_id): Path<String>,
    Query(query): Query<InterpretQuery>,
) -> Result<Json<InterpretResponse>, IngestError> {
    let session = session_store::read_session(&state.config.sessions_dir, &session_id)?;
    if session.segments.is_empty() {
        return Err(IngestError::EmptySegments);
    }

    let audio_path = session_store::get_session_audio_path(&state.config.sessions_dir, &session_id)
        .map(|p| p.to_string_lossy().into_owned());

    let job_id = state
        .pipeline
        .submit(&session_id, &session.segments, "sv", audio_path.as_deref(), Some(query.context.as_str()))
        .await
        .map_err(IngestError::Internal)?;

    let _ = session_store::update_session_metadata(
        &state.config.sessions_dir,
        &session_id,
        serde_json::json!({ "job_id": job_id.to_string(), "processing_status": "queued" }),
    );

    Ok(Json(InterpretResponse {
        session_id,
        context: query.context,
        job_id: job_id.to_string(),
        poll_url: format!("/api/jobs/{job_id}"),
    }))
}

#[derive(Debug, Serialize)]
pub struct InterpretationSummary {
    pub context_profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    pub segment_count: usize,
}

pub async fn list_interpretations(
    State(state): State<Arc<IngestState>>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    let interpretations = session_store::list_interpretations(&state.config.sessions_dir, &session_id);
    let map: serde_json::Map<String, Value> = interpretations
        .into_iter()
        .map(|(name, data)| {
            let context_profile = data.get("context_profile").and_then(|v| v.as_str()).unwrap_or(&name).to_string();
            let summary = data.get("summary").cloned();
            let segment_count = data.get("segments").and_then(|v| v.as_array()).map(|a| a.len()).unwrap_or(0);
            (name, serde_json::to_value(InterpretationSummary { context_profile, summary, segment_count }).unwrap())
        })
        .collect();

    Json(serde_json::json!({ "session_id": session_id, "interpretations": Value::Object(map) }))
}
