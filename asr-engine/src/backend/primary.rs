//! CPU-optimized backend: integer-quantized models, beam search, and
//! VAD-based silence trimming ahead of inference — spec.md §4.1.

use std::path::Path;

use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use whisper_common::{Backend, Segment};

use crate::backend::{validate_model_file, AsrBackend, TranscribeRequest};
use crate::decode::segments_from_state;
use crate::error::{EngineError, Result};
use crate::vad_trim::trim_silence;

const VAD_THRESHOLD: f32 = 0.5;

pub struct PrimaryBackend {
    ctx: WhisperContext,
    model_id: String,
}

impl PrimaryBackend {
    pub fn load(model_path: &Path, model_id: &str) -> Result<Self> {
        validate_model_file(model_path)?;

        info!(model = model_id, path = %model_path.display(), "loading primary backend model");
        let ctx = WhisperContext::new_with_params(
            model_path
                .to_str()
                .ok_or_else(|| EngineError::ModelNotFound(model_path.display().to_string()))?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| EngineError::ModelLoad {
            model_id: model_id.to_string(),
            source: anyhow::anyhow!(e.to_string()),
        })?;

        Ok(Self {
            ctx,
            model_id: model_id.to_string(),
        })
    }
}

impl AsrBackend for PrimaryBackend {
    fn kind(&self) -> Backend {
        Backend::Primary
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn transcribe(&self, req: &TranscribeRequest<'_>) -> Result<Vec<Segment>> {
        let (pcm, time_offset_secs) = trim_silence(req.pcm, VAD_THRESHOLD);
        debug!(
            model = %self.model_id,
            trimmed_leading_secs = time_offset_secs,
            samples = pcm.len(),
            "primary backend transcribing"
        );

        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: req.beam_size.max(1) as i32,
            patience: -1.0,
        });
        params.set_n_threads(num_cpus_hint());
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_token_timestamps(true);
        if req.language != "auto" {
            params.set_language(Some(req.language));
        }

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| EngineError::Inference(e.to_string()))?;
        state
            .full(params, &pcm)
            .map_err(|e| EngineError::Inference(e.to_string()))?;

        segments_from_state(&state, time_offset_secs)
    }
}

fn num_cpus_hint() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as i32)
        .unwrap_or(4)
}
