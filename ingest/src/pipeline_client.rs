//! HTTP client to the Pipeline Runner's internal job API — spec.md §4.3's
//! "submit job to B".

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use whisper_common::{JobRecord, Segment};

#[derive(Clone)]
pub struct PipelineClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    job_id: Uuid,
}

impl PipelineClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client builder"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn submit(
        &self,
        session_id: &str,
        segments: &[Segment],
        language: &str,
        audio_path: Option<&str>,
        context_profile: Option<&str>,
    ) -> anyhow::Result<Uuid> {
        let body = serde_json::json!({
            "segments": segments,
            "language": language,
            "session_id": session_id,
            "audio_path": audio_path,
            "context_profile": context_profile,
        });
        let resp = self
            .client
            .post(format!("{}/jobs", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: SubmitResponse = resp.json().await?;
        Ok(parsed.job_id)
    }

    /// Proxy `GET /jobs/{id}` for ingest's own `/api/jobs/{id}` surface, so
    /// callers poll the same host they submitted the ingest request to.
    pub async fn get_status(&self, job_id: Uuid) -> anyhow::Result<Option<JobRecord>> {
        let resp = self.client.get(format!("{}/jobs/{job_id}", self.base_url)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(resp.error_for_status()?.json().await?))
    }

    /// Proxy `GET /jobs/{id}/result`. Returns `Ok(None)` for a 409 (job not
    /// complete yet), matching the pipeline's own semantics.
    pub async fn get_result(&self, job_id: Uuid) -> anyhow::Result<Option<Value>> {
        let resp = self.client.get(format!("{}/jobs/{job_id}/result", self.base_url)).send().await?;
        if resp.status() == reqwest::StatusCode::CONFLICT || resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(resp.error_for_status()?.json().await?))
    }
}
