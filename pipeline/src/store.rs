//! Persistent job store — spec.md §4.2.1.
//!
//! `rusqlite`'s `Connection` is `!Send` across an `.await` point, the usual
//! friction of embedding a synchronous SQLite driver in an async service.
//! Every query therefore runs inside `tokio::task::spawn_blocking`, guarded
//! by a plain `std::sync::Mutex` — the standard idiom, and the one place
//! this codebase departs from its otherwise pure-async-fn style (noted in
//! DESIGN.md).

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use whisper_common::{JobRecord, JobStatus, PipelineStep};

use crate::error::PipelineError;

#[derive(Clone)]
pub struct JobStore {
    conn: Arc<Mutex<Connection>>,
}

impl JobStore {
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn: Arc::new(Mutex::new(conn)) };
        store.init_schema_sync()?;
        Ok(store)
    }

    fn init_schema_sync(&self) -> Result<(), PipelineError> {
        let conn = self.conn.lock().expect("job store mutex poisoned");
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                input_data TEXT NOT NULL DEFAULT '',
                result_data TEXT,
                current_step TEXT,
                error TEXT
            );",
        )?;
        Ok(())
    }

    pub async fn create(&self, input_data: serde_json::Value) -> Result<Uuid, PipelineError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Uuid, PipelineError> {
            let id = Uuid::new_v4();
            let now = Utc::now();
            let conn = conn.lock().expect("job store mutex poisoned");
            conn.execute(
                "INSERT INTO jobs (id, status, created_at, updated_at, input_data, result_data, current_step, error)
                 VALUES (?1, ?2, ?3, ?3, ?4, NULL, ?5, NULL)",
                rusqlite::params![
                    id.to_string(),
                    JobStatus::Pending.to_string(),
                    now.to_rfc3339(),
                    input_data.to_string(),
                    PipelineStep::Init.to_string(),
                ],
            )?;
            Ok(id)
        })
        .await
        .map_err(|e| PipelineError::Internal(anyhow::anyhow!(e)))?
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<JobRecord>, PipelineError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<JobRecord>, PipelineError> {
            let conn = conn.lock().expect("job store mutex poisoned");
            let mut stmt = conn.prepare(
                "SELECT id, status, created_at, updated_at, input_data, result_data, current_step, error
                 FROM jobs WHERE id = ?1",
            )?;
            let mut rows = stmt.query(rusqlite::params![id.to_string()])?;
            if let Some(row) = rows.next()? {
                Ok(Some(row_to_record(row)?))
            } else {
                Ok(None)
            }
        })
        .await
        .map_err(|e| PipelineError::Internal(anyhow::anyhow!(e)))?
    }

    /// `update(id, {status?, current_step?, result_data?, error?})`; always
    /// bumps `updated_at`. Unset fields are left untouched (spec.md §4.2.1).
    pub async fn update(&self, id: Uuid, patch: JobPatch) -> Result<(), PipelineError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), PipelineError> {
            let conn = conn.lock().expect("job store mutex poisoned");
            let now = Utc::now().to_rfc3339();
            if let Some(status) = patch.status {
                conn.execute(
                    "UPDATE jobs SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![status.to_string(), now, id.to_string()],
                )?;
            }
            if let Some(step) = patch.current_step {
                conn.execute(
                    "UPDATE jobs SET current_step = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![step.to_string(), now, id.to_string()],
                )?;
            }
            if let Some(result_data) = patch.result_data {
                conn.execute(
                    "UPDATE jobs SET result_data = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![result_data.to_string(), now, id.to_string()],
                )?;
            }
            if let Some(error) = patch.error {
                conn.execute(
                    "UPDATE jobs SET error = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![error, now, id.to_string()],
                )?;
            }
            Ok(())
        })
        .await
        .map_err(|e| PipelineError::Internal(anyhow::anyhow!(e)))?
    }
}

/// Partial update for a job record. All fields default to "leave untouched".
#[derive(Debug, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub current_step: Option<PipelineStep>,
    pub result_data: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl JobPatch {
    pub fn status(mut self, s: JobStatus) -> Self {
        self.status = Some(s);
        self
    }

    pub fn step(mut self, s: PipelineStep) -> Self {
        self.current_step = Some(s);
        self
    }

    pub fn result(mut self, v: serde_json::Value) -> Self {
        self.result_data = Some(v);
        self
    }

    pub fn error(mut self, e: impl Into<String>) -> Self {
        self.error = Some(e.into());
        self
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<JobRecord> {
    let id: String = row.get(0)?;
    let status: String = row.get(1)?;
    let created_at: String = row.get(2)?;
    let updated_at: String = row.get(3)?;
    let input_data: String = row.get(4)?;
    let result_data: Option<String> = row.get(5)?;
    let current_step: Option<String> = row.get(6)?;
    let error: Option<String> = row.get(7)?;

    Ok(JobRecord {
        id: id.parse().unwrap_or_else(|_| Uuid::nil()),
        status: parse_status(&status),
        created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
        updated_at: updated_at.parse().unwrap_or_else(|_| Utc::now()),
        input_data: serde_json::from_str(&input_data).unwrap_or(serde_json::Value::Null),
        result_data: result_data.and_then(|s| serde_json::from_str(&s).ok()),
        current_step: current_step.as_deref().and_then(parse_step),
        error,
    })
}

fn parse_status(s: &str) -> JobStatus {
    match s {
        "queued" => JobStatus::Queued,
        "running" => JobStatus::Running,
        "processing" => JobStatus::Processing,
        "completed" => JobStatus::Completed,
        "failed" => JobStatus::Failed,
        _ => JobStatus::Pending,
    }
}

fn parse_step(s: &str) -> Option<PipelineStep> {
    Some(match s {
        "init" => PipelineStep::Init,
        "confidence" => PipelineStep::Confidence,
        "retry" => PipelineStep::Retry,
        "diarization" => PipelineStep::Diarization,
        "language_detect" => PipelineStep::LanguageDetect,
        "text_processing" => PipelineStep::TextProcessing,
        "pii_flagging" => PipelineStep::PiiFlagging,
        "summary" => PipelineStep::Summary,
        "done" => PipelineStep::Done,
        "queued" => PipelineStep::Queued,
        "starting" => PipelineStep::Starting,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.db")).unwrap();
        let id = store.create(serde_json::json!({"language": "sv"})).await.unwrap();
        let rec = store.get(id).await.unwrap().unwrap();
        assert_eq!(rec.status, JobStatus::Pending);
        assert_eq!(rec.current_step, Some(PipelineStep::Init));
        assert_eq!(rec.input_data["language"], "sv");
    }

    #[tokio::test]
    async fn update_bumps_updated_at_and_leaves_unset_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.db")).unwrap();
        let id = store.create(serde_json::json!({})).await.unwrap();
        let before = store.get(id).await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .update(id, JobPatch::default().status(JobStatus::Running).step(PipelineStep::Starting))
            .await
            .unwrap();
        let after = store.get(id).await.unwrap().unwrap();

        assert_eq!(after.status, JobStatus::Running);
        assert_eq!(after.current_step, Some(PipelineStep::Starting));
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(after.input_data, before.input_data);
    }

    #[tokio::test]
    async fn get_missing_job_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::open(&dir.path().join("jobs.db")).unwrap();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
