//! Reads/writes against a session directory — spec.md §3/§9.
//!
//! `session.json` is shared with the Ingest Orchestrator, which writes
//! disjoint keys (base metadata) while the runner only ever merges in
//! `job_id`/`processing_status`/`processed_at`/`processing_error` (spec.md
//! §5's discipline). Every write here is write-temp-then-rename so a reader
//! never observes a half-written file.

use std::path::{Path, PathBuf};

use chrono::Utc;

use whisper_common::job::JobStatus;
use whisper_common::session::{InterpretationResult, SessionMetadata};

use crate::error::PipelineError;

pub fn session_dir(sessions_root: &Path, session_id: &str) -> PathBuf {
    sessions_root.join(session_id)
}

pub fn read_session(sessions_root: &Path, session_id: &str) -> Result<SessionMetadata, PipelineError> {
    let path = session_dir(sessions_root, session_id).join("session.json");
    let bytes = std::fs::read(&path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| PipelineError::Internal(anyhow::anyhow!("malformed session.json at {}: {e}", path.display())))
}

/// Atomically merge `{job_id, processing_status: completed, processed_at}`
/// (or the failed variant) into `session.json` — spec.md §4.2.3's result
/// writeback contract.
pub fn mark_session_completed(sessions_root: &Path, session_id: &str, job_id: uuid::Uuid) -> Result<(), PipelineError> {
    let mut meta = read_session(sessions_root, session_id)?;
    meta.job_id = Some(job_id.to_string());
    meta.processing_status = Some(JobStatus::Completed);
    meta.processed_at = Some(Utc::now());
    meta.processing_error = None;
    write_atomic(&session_dir(sessions_root, session_id).join("session.json"), &meta)
}

pub fn mark_session_failed(
    sessions_root: &Path,
    session_id: &str,
    job_id: uuid::Uuid,
    error: &str,
) -> Result<(), PipelineError> {
    let mut meta = read_session(sessions_root, session_id)?;
    meta.job_id = Some(job_id.to_string());
    meta.processing_status = Some(JobStatus::Failed);
    meta.processing_error = Some(error.to_string());
    write_atomic(&session_dir(sessions_root, session_id).join("session.json"), &meta)
}

/// `processed.json` (no context profile) or `interpreted_{context}.json`.
pub fn write_result(
    sessions_root: &Path,
    session_id: &str,
    context_profile: Option<&str>,
    result: &InterpretationResult,
) -> Result<(), PipelineError> {
    let filename = match context_profile {
        Some(ctx) => format!("interpreted_{ctx}.json"),
        None => "processed.json".to_string(),
    };
    write_atomic(&session_dir(sessions_root, session_id).join(filename), result)
}

pub fn read_result(
    sessions_root: &Path,
    session_id: &str,
    context_profile: Option<&str>,
) -> Result<InterpretationResult, PipelineError> {
    let filename = match context_profile {
        Some(ctx) => format!("interpreted_{ctx}.json"),
        None => "processed.json".to_string(),
    };
    let path = session_dir(sessions_root, session_id).join(filename);
    let bytes = std::fs::read(&path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| PipelineError::Internal(anyhow::anyhow!("malformed result file at {}: {e}", path.display())))
}

pub fn read_audio(sessions_root: &Path, session_id: &str) -> Result<Vec<u8>, PipelineError> {
    Ok(std::fs::read(session_dir(sessions_root, session_id).join("audio.wav"))?)
}

fn write_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| PipelineError::Internal(anyhow::anyhow!("failed to serialize {}: {e}", path.display())))?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use whisper_common::segment::Segment;

    fn sample_session(started_at: chrono::DateTime<Utc>) -> SessionMetadata {
        SessionMetadata {
            session_id: "2026-01-01_00-00-00_accurate".to_string(),
            profile: "accurate".to_string(),
            started_at,
            ended_at: started_at,
            duration: 3.0,
            chunks: 1,
            text: "hej da".to_string(),
            segments: vec![Segment::new(0.0, 1.0, "hej da")],
            audio_file: "audio.wav".to_string(),
            audio_format: "wav".to_string(),
            sample_rate: 16000,
            channels: 1,
            job_id: None,
            processing_status: None,
            processed_at: None,
            processing_error: None,
            source: Some("upload".to_string()),
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let session_id = "2026-01-01_00-00-00_accurate";
        std::fs::create_dir_all(dir.path().join(session_id)).unwrap();
        write_atomic(&dir.path().join(session_id).join("session.json"), &sample_session(ts)).unwrap();

        let loaded = read_session(dir.path(), session_id).unwrap();
        assert_eq!(loaded.text, "hej da");
    }

    #[test]
    fn mark_completed_merges_without_clobbering_base_fields() {
        let dir = tempfile::tempdir().unwrap();
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let session_id = "2026-01-01_00-00-00_accurate";
        std::fs::create_dir_all(dir.path().join(session_id)).unwrap();
        write_atomic(&dir.path().join(session_id).join("session.json"), &sample_session(ts)).unwrap();

        let job_id = uuid::Uuid::new_v4();
        mark_session_completed(dir.path(), session_id, job_id).unwrap();

        let loaded = read_session(dir.path(), session_id).unwrap();
        assert_eq!(loaded.processing_status, Some(JobStatus::Completed));
        assert_eq!(loaded.job_id, Some(job_id.to_string()));
        assert_eq!(loaded.text, "hej da");
    }

    #[test]
    fn write_result_uses_context_filename() {
        let dir = tempfile::tempdir().unwrap();
        let session_id = "2026-01-01_00-00-00_accurate";
        let result = InterpretationResult {
            language: "sv".to_string(),
            context_profile: Some("meeting".to_string()),
            segments: vec![Segment::new(0.0, 1.0, "hej")],
            summary: None,
        };
        write_result(dir.path(), session_id, Some("meeting"), &result).unwrap();
        assert!(dir.path().join(session_id).join("interpreted_meeting.json").exists());

        let loaded = read_result(dir.path(), session_id, Some("meeting")).unwrap();
        assert_eq!(loaded.language, "sv");
    }
}
