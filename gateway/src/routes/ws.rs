//! `WS /ws/transcribe` — spec.md §6. Control-message protocol for
//! interactive real-time transcription directly against the Gateway, no
//! session persistence involved (that lives in the Ingest Orchestrator's own
//! chunk-based real-time ingest, which calls this service's plain
//! `POST /transcribe` per chunk instead of this socket).
//!
//! Client frames: `{action:"start", language, profile}`,
//! `{action:"audio", data:<base64 PCM16 16kHz>}`, `{action:"process"}`,
//! `{action:"stop"}`. Server frames: `{type:"status", ...}`,
//! `{type:"transcript", ...}`. On `process` the accumulated buffer is
//! transcribed and then cleared.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use asr_engine::backend::TranscribeRequest;
use asr_engine::decode::round4;
use asr_engine::{confidence, noise_filter};
use whisper_common::{Backend, Segment, TranscriptionProfile};

use crate::routes::parse_profile_or_default;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ClientFrame {
    Start {
        #[serde(default = "default_language")]
        language: String,
        #[serde(default)]
        profile: Option<String>,
    },
    Audio {
        data: String,
    },
    Process,
    Stop,
}

fn default_language() -> String {
    "sv".to_string()
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerFrame {
    Status {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        profile: Option<String>,
    },
    Transcript {
        text: String,
        is_final: bool,
        segments: Vec<Segment>,
        profile: String,
        backend: String,
        inference_time: f64,
    },
}

pub async fn ws_transcribe(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

struct Session {
    language: String,
    profile: TranscriptionProfile,
    buffer: Vec<f32>,
}

impl Default for Session {
    fn default() -> Self {
        Self { language: default_language(), profile: TranscriptionProfile::default(), buffer: Vec::new() }
    }
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut session = Session::default();

    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else { continue };
        match serde_json::from_str::<ClientFrame>(&text) {
            Ok(ClientFrame::Start { language, profile }) => {
                session.language = language;
                session.profile = parse_profile_or_default(profile.as_deref());
                session.buffer.clear();
                let _ = send(
                    &mut socket,
                    ServerFrame::Status { message: "started".to_string(), profile: Some(session.profile.as_str().to_string()) },
                )
                .await;
            }
            Ok(ClientFrame::Audio { data }) => match decode_pcm16(&data) {
                Ok(samples) => session.buffer.extend(samples),
                Err(e) => {
                    let _ = send(&mut socket, ServerFrame::Status { message: e, profile: None }).await;
                }
            },
            Ok(ClientFrame::Process) => {
                let frame = run_inference(&state, &session).await;
                session.buffer.clear();
                let _ = send(&mut socket, frame).await;
            }
            Ok(ClientFrame::Stop) => break,
            Err(e) => {
                let _ = send(&mut socket, ServerFrame::Status { message: format!("invalid frame: {e}"), profile: None }).await;
            }
        }
    }
}

fn decode_pcm16(b64: &str) -> Result<Vec<f32>, String> {
    let bytes = BASE64.decode(b64.as_bytes()).map_err(|e| format!("invalid base64 audio: {e}"))?;
    Ok(bytes.chunks_exact(2).map(|c| i16::from_le_bytes([c[0], c[1]]) as f32 / i16::MAX as f32).collect())
}

async fn run_inference(state: &Arc<AppState>, session: &Session) -> ServerFrame {
    let spec = session.profile.spec();
    let start = Instant::now();

    let (backend_used, backend) = match state.backend_for_profile(session.profile).await {
        Ok(b) => b,
        Err(e) => return ServerFrame::Status { message: e.to_string(), profile: None },
    };

    let req = TranscribeRequest { pcm: &session.buffer, language: &session.language, beam_size: spec.beam_size };
    let mut segments = match backend.transcribe(&req) {
        Ok(s) => s,
        Err(e) => return ServerFrame::Status { message: e.to_string(), profile: None },
    };

    for seg in &mut segments {
        seg.low_confidence = Some(confidence::is_low_confidence(seg));
    }
    if backend_used == Backend::Accelerator {
        segments.retain(|s| !noise_filter::is_noise(s));
    }

    let text = segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ").trim().to_string();
    let inference_time = round4(start.elapsed().as_secs_f64());

    ServerFrame::Transcript {
        text,
        is_final: true,
        segments,
        profile: session.profile.as_str().to_string(),
        backend: backend_used.to_string(),
        inference_time,
    }
}

async fn send(socket: &mut WebSocket, frame: ServerFrame) -> Result<(), axum::Error> {
    let json = serde_json::to_string(&frame).expect("ServerFrame always serializes");
    socket.send(Message::Text(json)).await
}
