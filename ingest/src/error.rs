use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Tom audiofil")]
    EmptyUpload,

    #[error("Session hittades inte")]
    SessionNotFound,

    #[error("Sessionen har inga segment")]
    EmptySegments,

    #[error("Ljudfil hittades inte")]
    AudioNotFound,

    #[error("Jobbet ar inte klart an")]
    JobNotComplete,

    #[error("Jobbet hittades inte")]
    JobNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = match &self {
            IngestError::EmptyUpload => StatusCode::BAD_REQUEST,
            IngestError::SessionNotFound => StatusCode::NOT_FOUND,
            IngestError::EmptySegments => StatusCode::BAD_REQUEST,
            IngestError::AudioNotFound => StatusCode::NOT_FOUND,
            IngestError::JobNotComplete => StatusCode::CONFLICT,
            IngestError::JobNotFound => StatusCode::NOT_FOUND,
            IngestError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IngestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
