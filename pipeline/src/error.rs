use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown job: {0}")]
    JobNotFound(uuid::Uuid),

    #[error("job is not complete")]
    JobNotComplete,

    #[error("invalid job input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match &self {
            PipelineError::JobNotFound(_) => StatusCode::NOT_FOUND,
            PipelineError::JobNotComplete => StatusCode::CONFLICT,
            PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PipelineError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::Sql(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
