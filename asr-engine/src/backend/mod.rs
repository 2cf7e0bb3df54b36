pub mod accelerator;
pub mod primary;

use whisper_common::{Backend, Segment};

use crate::error::Result;

/// A transcription request against an already-loaded model.
pub struct TranscribeRequest<'a> {
    pub pcm: &'a [f32],
    pub language: &'a str,
    pub beam_size: usize,
}

/// A loaded, ready-to-run ASR model. Both backends implement this the same
/// way from the caller's point of view; what differs is sampling strategy,
/// precision, and whether VAD trimming runs first (spec.md §4.1).
pub trait AsrBackend: Send + Sync {
    fn kind(&self) -> Backend;
    fn model_id(&self) -> &str;
    fn transcribe(&self, req: &TranscribeRequest<'_>) -> Result<Vec<Segment>>;
}

/// Validate a model file's size is in the plausible range for a Whisper
/// model, the same loose sanity check the CLI applies before loading.
pub fn validate_model_file(path: &std::path::Path) -> Result<()> {
    use crate::error::EngineError;

    if !path.exists() {
        return Err(EngineError::ModelNotFound(path.display().to_string()));
    }
    let metadata = std::fs::metadata(path)?;
    let size_mb = metadata.len() / (1024 * 1024);
    if !(30..=4000).contains(&size_mb) {
        return Err(EngineError::ModelLoad {
            model_id: path.display().to_string(),
            source: anyhow::anyhow!(
                "model file size {size_mb}MB is outside the expected 30-4000MB range"
            ),
        });
    }
    Ok(())
}
