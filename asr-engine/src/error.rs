use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("failed to load model {model_id}: {source}")]
    ModelLoad {
        model_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("accelerator backend unavailable, compiled without the `accelerator` feature")]
    AcceleratorUnavailable,

    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
