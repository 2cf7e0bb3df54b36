//! Shared ingest logic — common path for both the REST `/api/ingest`
//! endpoint and the WebSocket real-time flow. Grounded on
//! `original_source/backend/services/ingest_service.py`, which the Python
//! original factors out for exactly the same reason (one file upload is
//! just a one-chunk, one-transcript real-time session).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::IngestError;
use crate::gateway_client::TranscribeResult;
use crate::session_store;
use crate::state::IngestState;

pub struct IngestOutcome {
    pub session_id: String,
    pub job_id: Option<Uuid>,
    pub text: String,
    pub language: String,
    pub segment_count: usize,
}

/// Persist a session from one or more (chunk, transcript) pairs and submit
/// the pipeline job. Used for both a single-file upload (one chunk) and a
/// finalized real-time recording (many chunks).
pub async fn persist_and_submit(
    state: &IngestState,
    audio_chunks: &[Vec<u8>],
    transcripts: &[TranscribeResult],
    profile: &str,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    context_profile: Option<&str>,
    source: &str,
) -> Result<IngestOutcome, IngestError> {
    let metadata =
        session_store::create_session(&state.config.sessions_dir, audio_chunks, transcripts, profile, started_at, ended_at, source)
            .await?;

    let language = transcripts
        .iter()
        .map(|t| t.language.clone())
        .find(|l| !l.is_empty())
        .unwrap_or_else(|| "sv".to_string());

    let audio_path = session_store::session_dir(&state.config.sessions_dir, &metadata.session_id)
        .join("audio.wav")
        .to_string_lossy()
        .into_owned();

    let job_id = state
        .pipeline
        .submit(&metadata.session_id, &metadata.segments, &language, Some(&audio_path), context_profile)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %metadata.session_id, error = %e, "failed to submit pipeline job");
            e
        })
        .ok();

    if let Some(job_id) = job_id {
        let _ = session_store::update_session_metadata(
            &state.config.sessions_dir,
            &metadata.session_id,
            serde_json::json!({ "job_id": job_id.to_string(), "processing_status": "queued" }),
        );
    }

    Ok(IngestOutcome {
        session_id: metadata.session_id,
        job_id,
        text: metadata.text,
        language,
        segment_count: metadata.segments.len(),
    })
}
