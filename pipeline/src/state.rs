use std::sync::Arc;

use crate::config::Config;
use crate::queue::JobQueue;
use crate::store::JobStore;

/// Axum state for the pipeline's internal job API.
pub struct PipelineState {
    pub config: Config,
    pub store: JobStore,
    pub queue: Arc<JobQueue>,
}
