use std::sync::Arc;
use std::time::Instant;

use asr_engine::backend::TranscribeRequest;
use asr_engine::decode::{round3, round4};
use asr_engine::{confidence, noise_filter};
use axum::extract::{Multipart, Query, State};
use axum::Json;
use whisper_common::Backend;

use crate::error::GatewayError;
use crate::routes::parse_profile_or_default;
use crate::audio;
use crate::state::AppState;
use crate::types::{TranscribeQuery, TranscribeResponse};

pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranscribeQuery>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, GatewayError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::Internal(anyhow::anyhow!(e)))?
    {
        if field.name() == Some("file") {
            file_bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| GatewayError::Internal(anyhow::anyhow!(e)))?
                    .to_vec(),
            );
        }
    }

    let file_bytes = file_bytes.ok_or(GatewayError::EmptyUpload)?;
    if file_bytes.is_empty() {
        return Err(GatewayError::EmptyUpload);
    }

    let pcm = audio::decode_wav_to_pcm(&file_bytes)?;
    let profile = parse_profile_or_default(query.profile.as_deref());
    let spec = profile.spec();

    let start = Instant::now();
    let (backend_used, backend) = state.backend_for_profile(profile).await?;
    let req = TranscribeRequest {
        pcm: &pcm,
        language: &query.language,
        beam_size: spec.beam_size,
    };
    let mut segments = backend.transcribe(&req)?;
    let inference_time = start.elapsed().as_secs_f64();

    for seg in &mut segments {
        seg.low_confidence = Some(confidence::is_low_confidence(seg));
    }

    // Noise filter only applies to accelerator output, which has no VAD gate.
    if backend_used == Backend::Accelerator {
        segments.retain(|s| !noise_filter::is_noise(s));
    }

    if !query.include_timestamps {
        for seg in &mut segments {
            seg.words.clear();
        }
    }

    let text = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    let duration = segments.last().map(|s| round3(s.end));

    Ok(Json(TranscribeResponse {
        text,
        language: query.language.clone(),
        // Language is caller-specified here, not detected: the Gateway never
        // runs language ID itself. Per-segment language detection happens in
        // the pipeline's `language_detect` stage (spec.md §4.2.3).
        language_probability: None,
        segments,
        duration,
        backend: backend_used.to_string(),
        profile: profile.as_str().to_string(),
        inference_time: round4(inference_time),
    }))
}
