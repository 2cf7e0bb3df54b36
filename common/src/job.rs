//! Pipeline job record — spec.md §3/§4.2.1.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Queued,
    Running,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Names the pipeline stage currently in progress — polled by clients via
/// `GET /jobs/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Init,
    Confidence,
    Retry,
    Diarization,
    LanguageDetect,
    TextProcessing,
    PiiFlagging,
    Summary,
    Done,
    Queued,
    Starting,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStep::Init => "init",
            PipelineStep::Confidence => "confidence",
            PipelineStep::Retry => "retry",
            PipelineStep::Diarization => "diarization",
            PipelineStep::LanguageDetect => "language_detect",
            PipelineStep::TextProcessing => "text_processing",
            PipelineStep::PiiFlagging => "pii_flagging",
            PipelineStep::Summary => "summary",
            PipelineStep::Done => "done",
            PipelineStep::Queued => "queued",
            PipelineStep::Starting => "starting",
        };
        write!(f, "{s}")
    }
}

/// A persistent job record, authoritative for polling (spec.md §4.2.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub input_data: serde_json::Value,
    pub result_data: Option<serde_json::Value>,
    pub current_step: Option<PipelineStep>,
    pub error: Option<String>,
}
