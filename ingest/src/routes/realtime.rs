//! `WS /ws/transcribe` — real-time chunk ingest. Grounded on
//! `original_source/backend/routers/realtime.py`: the client streams
//! encoded audio chunks (e.g. WebM/Opus from a browser recorder); each
//! chunk is buffered for the eventual WAV concatenation *and* transcribed
//! individually via the Gateway's plain `POST /transcribe` (this is a
//! distinct endpoint from the Gateway's own `/ws/transcribe`, which serves
//! interactive low-latency transcription with no session persistence).
//!
//! Chunks under 500 bytes are dropped before transcription (spec.md §4.3's
//! real-time short-chunk rule). On disconnect the accumulated chunks and
//! transcripts are finalized into a session and a pipeline job is
//! submitted — mirrors `finalize_realtime_session` in the Python original.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::finalize;
use crate::gateway_client::TranscribeResult;
use crate::noise;
use crate::state::IngestState;

const MIN_CHUNK_BYTES: usize = 500;

#[derive(Debug, Deserialize)]
pub struct RealtimeQuery {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default)]
    pub context: Option<String>,
}

fn default_profile() -> String {
    "accurate".to_string()
}

#[derive(Serialize)]
struct ChunkFrame<'a> {
    text: String,
    chunk: usize,
    profile: &'a str,
    segments: &'a [whisper_common::Segment],
}

#[derive(Serialize)]
struct ErrorFrame {
    error: String,
}

pub async fn ws_ingest(
    ws: WebSocketUpgrade,
    Query(query): Query<RealtimeQuery>,
    State(state): State<Arc<IngestState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<IngestState>, query: RealtimeQuery) {
    let mut chunk_index = 0usize;
    let mut audio_chunks: Vec<Vec<u8>> = Vec::new();
    let mut transcripts: Vec<TranscribeResult> = Vec::new();
    let started_at = Utc::now();

    while let Some(Ok(msg)) = socket.recv().await {
        let data: Vec<u8> = match msg {
            Message::Binary(bytes) => bytes.to_vec(),
            Message::Close(_) => break,
            _ => continue,
        };

        if data.is_empty() || data.len() < MIN_CHUNK_BYTES {
            continue;
        }

        audio_chunks.push(data.clone());

        match state.gateway.transcribe(&data, "chunk.webm", &query.profile).await {
            Ok(result) => {
                let text = result.text.trim();
                if noise::is_noise_text(text) {
                    continue;
                }
                let frame = ChunkFrame { text: text.to_string(), chunk: chunk_index, profile: &query.profile, segments: &result.segments };
                let payload = serde_json::to_string(&frame).expect("ChunkFrame always serializes");
                transcripts.push(result);
                chunk_index += 1;
                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                let payload = serde_json::to_string(&ErrorFrame { error: e.to_string() }).expect("ErrorFrame always serializes");
                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
        }
    }

    if audio_chunks.is_empty() {
        return;
    }

    let ended_at = Utc::now();
    match finalize::persist_and_submit(&state, &audio_chunks, &transcripts, &query.profile, started_at, ended_at, query.context.as_deref(), "realtime").await {
        Ok(outcome) => info!(session_id = %outcome.session_id, job_id = ?outcome.job_id, "realtime session finalized"),
        Err(e) => error!(error = %e, "failed to finalize realtime session"),
    }
}
