use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("empty upload")]
    EmptyUpload,

    #[error("invalid base64 audio: {0}")]
    InvalidBase64(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Engine(#[from] asr_engine::EngineError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::EmptyUpload => StatusCode::BAD_REQUEST,
            GatewayError::InvalidBase64(_) => StatusCode::BAD_REQUEST,
            GatewayError::ModelUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
