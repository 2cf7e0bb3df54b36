//! `POST /api/ingest` — spec.md §4.3/§6. The one endpoint every client
//! (web, desktop, CLI) uses: upload a file, get back a transcript plus a
//! poll URL for the post-processing job. Grounded on
//! `original_source/backend/routers/ingest.py`.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::finalize;
use crate::state::IngestState;

#[derive(Debug, Deserialize)]
pub struct IngestQuery {
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_profile() -> String {
    "accurate".to_string()
}

fn default_source() -> String {
    "api".to_string()
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub session_id: String,
    pub job_id: Option<String>,
    pub poll_url: Option<String>,
    pub text: String,
    pub language: String,
    pub segment_count: usize,
}

pub async fn ingest(
    State(state): State<Arc<IngestState>>,
    Query(query): Query<IngestQuery>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>, IngestError> {
    let mut audio_bytes: Option<Vec<u8>> = None;
    let mut filename = "audio.wav".to_string();

    while let Some(field) = multipart.next_field().await.map_err(|e| IngestError::Internal(anyhow::anyhow!(e)))? {
        if field.name() == Some("file") {
            if let Some(name) = field.file_name() {
                filename = name.to_string();
            }
            audio_bytes = Some(field.bytes().await.map_err(|e| IngestError::Internal(anyhow::anyhow!(e)))?.to_vec());
        }
    }

    let audio_bytes = audio_bytes.ok_or(IngestError::EmptyUpload)?;
    if audio_bytes.is_empty() {
        return Err(IngestError::EmptyUpload);
    }

    let transcript = state.gateway.transcribe(&audio_bytes, &filename, &query.profile).await.map_err(IngestError::Internal)?;

    let started_at = Utc::now();
    let outcome = finalize::persist_and_submit(
        &state,
        &[audio_bytes],
        &[transcript],
        &query.profile,
        started_at,
        started_at,
        query.context.as_deref(),
        &query.source,
    )
    .await?;

    Ok(Json(IngestResponse {
        session_id: outcome.session_id,
        job_id: outcome.job_id.map(|id| id.to_string()),
        poll_url: outcome.job_id.map(|id| format!("/api/jobs/{id}")),
        text: outcome.text,
        language: outcome.language,
        segment_count: outcome.segment_count,
    }))
}
