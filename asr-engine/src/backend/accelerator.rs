//! GPU/accelerator backend: half-precision, greedy decoding only, no
//! built-in VAD. Feature-gated behind `accelerator`: a stub implementation
//! exists when the feature is compiled out so the gateway can always
//! construct one and fall back to `primary` transparently when
//! `is_available()` is false.

use whisper_common::Backend;

use crate::error::Result;

#[cfg(feature = "accelerator")]
mod enabled {
    use std::path::Path;

    use tracing::info;
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    use whisper_common::{Backend, Segment};

    use crate::backend::{validate_model_file, AsrBackend, TranscribeRequest};
    use crate::decode::segments_from_state;
    use crate::error::{EngineError, Result};

    pub struct AcceleratorBackend {
        ctx: WhisperContext,
        model_id: String,
    }

    impl AcceleratorBackend {
        pub fn load(model_path: &Path, model_id: &str) -> Result<Self> {
            validate_model_file(model_path)?;

            info!(model = model_id, path = %model_path.display(), "loading accelerator backend model");
            let mut params = WhisperContextParameters::default();
            params.use_gpu(true);
            let ctx = WhisperContext::new_with_params(
                model_path
                    .to_str()
                    .ok_or_else(|| EngineError::ModelNotFound(model_path.display().to_string()))?,
                params,
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

    impl AsrBackend for AcceleratorBackend {
        fn kind(&self) -> Backend {
            Backend::Accelerator
        }

        fn model_id(&self) -> &str {
            &self.model_id
        }

        // Greedy decoding only, no VAD trim: accelerator profiles are tuned
        // for short, low-latency chunks where silence trimming isn't worth
        // the extra pass.
        fn transcribe(&self, req: &TranscribeRequest<'_>) -> Result<Vec<Segment>> {
            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_n_threads(2);
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
                .full(params, req.pcm)
                .map_err(|e| EngineError::Inference(e.to_string()))?;

            segments_from_state(&state, 0.0)
        }
    }
}

#[cfg(feature = "accelerator")]
pub use enabled::AcceleratorBackend;

#[cfg(not(feature = "accelerator"))]
pub struct AcceleratorBackend;

#[cfg(not(feature = "accelerator"))]
impl AcceleratorBackend {
    pub fn load(_model_path: &std::path::Path, _model_id: &str) -> Result<Self> {
        Err(crate::error::EngineError::AcceleratorUnavailable)
    }
}

#[cfg(not(feature = "accelerator"))]
impl crate::backend::AsrBackend for AcceleratorBackend {
    fn kind(&self) -> Backend {
        Backend::Accelerator
    }

    fn model_id(&self) -> &str {
        "unavailable"
    }

    fn transcribe(
        &self,
        _req: &crate::backend::TranscribeRequest<'_>,
    ) -> Result<Vec<whisper_common::Segment>> {
        Err(crate::error::EngineError::AcceleratorUnavailable)
    }
}

/// Whether this build was compiled with the accelerator backend. The
/// gateway uses this at startup to decide whether a `profile` requesting
/// `accelerator` should fall back to `primary` (spec.md §4.1).
pub fn is_available() -> bool {
    cfg!(feature = "accelerator")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_matches_feature_flag() {
        assert_eq!(is_available(), cfg!(feature = "accelerator"));
    }

    #[cfg(not(feature = "accelerator"))]
    #[test]
    fn stub_load_reports_unavailable() {
        use crate::error::EngineError;
        let result = AcceleratorBackend::load(std::path::Path::new("/nonexistent"), "x");
        assert!(matches!(result, Err(EngineError::AcceleratorUnavailable)));
    }
}
