//! `POST /jobs`, `GET /jobs/{id}`, `GET /jobs/{id}/result` — spec.md §6.
//! Internal API, expected to be bound to loopback only (not this crate's
//! concern — deployment detail).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use whisper_common::job::JobStatus;

use crate::error::PipelineError;
use crate::runner;
use crate::state::PipelineState;

#[derive(Serialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

pub async fn submit(State(state): State<Arc<PipelineState>>, Json(body): Json<Value>) -> Result<Json<SubmitResponse>, PipelineError> {
    runner::validate_job_input(&body)?;
    let job_id = state.store.create(body).await?;
    state
        .queue
        .enqueue(&state.store, job_id)
        .await
        .map_err(PipelineError::Internal)?;
    Ok(Json(SubmitResponse { job_id, status: JobStatus::Queued }))
}

pub async fn get_status(State(state): State<Arc<PipelineState>>, Path(id): Path<Uuid>) -> Result<Json<whisper_common::JobRecord>, PipelineError> {
    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or(PipelineError::JobNotFound(id))
}

pub async fn get_result(State(state): State<Arc<PipelineState>>, Path(id): Path<Uuid>) -> Result<Json<Value>, PipelineError> {
    let record = state.store.get(id).await?.ok_or(PipelineError::JobNotFound(id))?;
    if record.status != JobStatus::Completed {
        return Err(PipelineError::JobNotComplete);
    }
    record.result_data.map(Json).ok_or(PipelineError::JobNotComplete)
}
