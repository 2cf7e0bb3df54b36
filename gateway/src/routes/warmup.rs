//! `POST /warmup?profile=...` — spec.md §4.1/§9. For the accelerator
//! backend this must force actual graph materialization by transcribing a
//! synthesized 100ms silent WAV, not just touch-loading the model file.

use std::sync::Arc;
use std::time::Instant;

use asr_engine::backend::TranscribeRequest;
use asr_engine::decode::round4;
use asr_engine::silence_wav;
use axum::extract::{Query, State};
use axum::Json;
use whisper_common::Backend;

use crate::routes::parse_profile_or_default;
use crate::state::AppState;
use crate::types::{WarmupQuery, WarmupResponse};

pub async fn warmup(State(state): State<Arc<AppState>>, Query(query): Query<WarmupQuery>) -> Json<WarmupResponse> {
    let profile = parse_profile_or_default(query.profile.as_deref());
    let spec = profile.spec();
    let backend_used = state.resolve_backend(profile);

    let start = Instant::now();
    let samples = match silence_wav::silent_pcm_samples() {
        Ok(s) => s,
        Err(e) => {
            return Json(WarmupResponse {
                status: "error".to_string(),
                profile: profile.as_str().to_string(),
                model: spec.model_id.to_string(),
                backend: backend_used.to_string(),
                load_time: 0.0,
                detail: Some(e.to_string()),
            })
        }
    };

    let result = match backend_used {
        Backend::Primary => state
            .primary_backend(spec.model_id)
            .await
            .map(|b| b.transcribe(&TranscribeRequest { pcm: &samples, language: "sv", beam_size: 1 })),
        Backend::Accelerator => state
            .accelerator_backend(spec.model_id)
            .await
            .map(|b| b.transcribe(&TranscribeRequest { pcm: &samples, language: "sv", beam_size: 1 })),
    };

    let load_time = round4(start.elapsed().as_secs_f64());

    let outcome: Result<(), crate::error::GatewayError> = match result {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => Json(WarmupResponse {
            status: "ok".to_string(),
            profile: profile.as_str().to_string(),
            model: spec.model_id.to_string(),
            backend: backend_used.to_string(),
            load_time,
            detail: None,
        }),
        Err(e) => Json(WarmupResponse {
            status: "error".to_string(),
            profile: profile.as_str().to_string(),
            model: spec.model_id.to_string(),
            backend: backend_used.to_string(),
            load_time,
            detail: Some(warmup_detail(backend_used, &e)),
        }),
    }
}

fn warmup_detail(backend: Backend, err: &crate::error::GatewayError) -> String {
    if let crate::error::GatewayError::Engine(asr_engine::EngineError::ModelNotFound(path)) = err {
        if matches!(backend, Backend::Accelerator) {
            return format!("MLX-modell saknas: {path}");
        }
    }
    err.to_string()
}
