//! `POST /transcribe/retry` — spec.md §4.1. Always runs on the primary
//! backend (retry is batch context, never real-time), over the whole blob
//! with no pre-slicing, then keeps only segments overlapping `[start, end]`.

use std::sync::Arc;

use asr_engine::backend::TranscribeRequest;
use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::audio;
use crate::error::GatewayError;
use crate::state::AppState;
use crate::types::{RetryRequest, RetryResponse};

pub async fn retry(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RetryRequest>,
) -> Result<Json<RetryResponse>, GatewayError> {
    let audio_bytes = BASE64
        .decode(body.audio_base64.as_bytes())
        .map_err(|e| GatewayError::InvalidBase64(e.to_string()))?;
    let pcm = audio::decode_wav_to_pcm(&audio_bytes)?;

    let backend = state.primary_backend(&body.model).await?;
    let req = TranscribeRequest {
        pcm: &pcm,
        language: &body.language,
        beam_size: body.beam_size,
    };
    let all_segments = backend.transcribe(&req)?;

    let mut segments = Vec::new();
    for seg in all_segments {
        if seg.end < body.start {
            continue;
        }
        if seg.start > body.end {
            break;
        }
        segments.push(seg);
    }

    Ok(Json(RetryResponse {
        segments,
        language: body.language,
        language_probability: None,
        model: body.model,
        beam_size: body.beam_size,
    }))
}
