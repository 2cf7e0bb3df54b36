//! `GET /api/sessions`, `GET /api/sessions/{id}`, `GET /api/sessions/{id}/audio`
//! — spec.md §6. Grounded on
//! `original_source/backend/routers/sessions.py`.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use whisper_common::SessionMetadata;

use crate::error::IngestError;
use crate::session_store;
use crate::state::IngestState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

pub async fn list(State(state): State<Arc<IngestState>>, Query(query): Query<ListQuery>) -> Json<serde_json::Value> {
    let limit = query.limit.clamp(1, 200);
    let sessions = session_store::list_sessions(&state.config.sessions_dir, limit, query.offset);
    Json(serde_json::json!({ "sessions": sessions }))
}

pub async fn detail(State(state): State<Arc<IngestState>>, Path(session_id): Path<String>) -> Result<Json<SessionMetadata>, IngestError> {
    Ok(Json(session_store::read_session(&state.config.sessions_dir, &session_id)?))
}

pub async fn audio(State(state): State<Arc<IngestState>>, Path(session_id): Path<String>) -> Result<Response, IngestError> {
    let path = session_store::get_session_audio_path(&state.config.sessions_dir, &session_id).ok_or(IngestError::AudioNotFound)?;
    let bytes = tokio::fs::read(&path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{session_id}.wav\"")),
        ],
        Body::from(bytes),
    )
        .into_response())
}
