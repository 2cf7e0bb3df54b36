//! `GET /api/jobs/{id}`, `GET /api/jobs/{id}/result` — a thin proxy onto
//! the Pipeline Runner's internal job API, so a caller only ever needs to
//! know about this service's `poll_url`, not the pipeline's own (loopback)
//! address.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::error::IngestError;
use crate::state::IngestState;

pub async fn get_status(State(state): State<Arc<IngestState>>, Path(id): Path<Uuid>) -> Result<Json<whisper_common::JobRecord>, IngestError> {
    state.pipeline.get_status(id).await.map_err(IngestError::Internal)?.map(Json).ok_or(IngestError::JobNotFound)
}

pub async fn get_result(State(state): State<Arc<IngestState>>, Path(id): Path<Uuid>) -> Result<Json<serde_json::Value>, IngestError> {
    state.pipeline.get_result(id).await.map_err(IngestError::Internal)?.map(Json).ok_or(IngestError::JobNotComplete)
}
