//! Orchestrates the six pipeline stages for one job — spec.md §4.2.3.
//!
//! Effective-flag resolution: if the job's `context_profile` names the flag,
//! use the profile's value; otherwise use the config default. `confidence`,
//! `retry`, and `language_detect` are config-only per the stage table —
//! they have no corresponding field on `ContextProfile`.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use whisper_common::context::{default_summary_prompt, ContextProfileName};
use whisper_common::job::{JobStatus, PipelineStep};
use whisper_common::session::InterpretationResult;
use whisper_common::Segment;

use crate::clients::{DiarizerClient, GatewayClient, LlmClient};
use crate::config::Config;
use crate::queue::JobRunner;
use crate::session_io;
use crate::stages::{confidence, diarization, language_detect, pii_flagging, retry, summary, text_processing};
use crate::store::{JobPatch, JobStore};

/// Body of `POST /jobs` — spec.md §6.
#[derive(Debug, Deserialize)]
pub struct JobInput {
    pub segments: Vec<Segment>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub audio_base64: Option<String>,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub context_profile: Option<String>,
}

fn default_language() -> String {
    "sv".to_string()
}

pub struct Runner {
    config: Config,
    store: JobStore,
    gateway: GatewayClient,
    diarizer: Option<DiarizerClient>,
    llm: Option<LlmClient>,
}

impl Runner {
    pub fn new(config: Config, store: JobStore) -> Self {
        let gateway = GatewayClient::new(&config.gateway_url, config.http_timeout);
        let diarizer = config.diarizer_url.as_deref().map(|url| DiarizerClient::new(url, config.http_timeout));
        let llm = config.llm_url.as_deref().map(|url| LlmClient::new(url, &config.llm_model));
        Self { config, store, gateway, diarizer, llm }
    }

    async fn execute(&self, job_id: Uuid) -> anyhow::Result<()> {
        let record = self
            .store
            .get(job_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("job {job_id} vanished from the store"))?;
        let input: JobInput = serde_json::from_value(record.input_data)?;

        self.store
            .update(job_id, JobPatch::default().status(JobStatus::Processing).step(PipelineStep::Confidence))
            .await?;

        let context = input
            .context_profile
            .as_deref()
            .map(ContextProfileName::from_str)
            .transpose()?;
        let profile = context.map(|c| c.profile());

        let mut segments = input.segments;

        confidence::run(&mut segments);

        if self.config.retry_enabled {
            self.store.update(job_id, JobPatch::default().step(PipelineStep::Retry)).await?;
            if let Some(audio_bytes) = self.audio_bytes(&input).await? {
                retry::run(
                    &mut segments,
                    &audio_bytes,
                    &self.gateway,
                    &input.language,
                    self.config.retry_beam_size,
                    self.config.retry_with_large,
                    self.config.http_retries,
                    self.config.http_retry_backoff,
                )
                .await;
            } else {
                info!(job_id = %job_id, "retry stage: no audio available for this job, skipping");
            }
        }

        if self.effective_flag(profile.as_ref(), |p| p.diarization, self.config.diarization_enabled) {
            self.store.update(job_id, JobPatch::default().step(PipelineStep::Diarization)).await?;
            let audio_bytes = self.audio_bytes(&input).await?;
            diarization::run(&mut segments, audio_bytes.as_deref(), self.diarizer.as_ref()).await;
        }

        if self.config.lang_detect_enabled {
            self.store.update(job_id, JobPatch::default().step(PipelineStep::LanguageDetect)).await?;
            language_detect::run(&mut segments, &input.language);
        }

        let casing = profile.as_ref().map(|p| p.casing).unwrap_or(self.config.casing_profile);
        if self.effective_flag(profile.as_ref(), |p| p.text_processing, self.config.text_processing_enabled) {
            self.store.update(job_id, JobPatch::default().step(PipelineStep::TextProcessing)).await?;
            text_processing::run(&mut segments, casing);
        }

        if self.effective_flag(profile.as_ref(), |p| p.pii, self.config.pii_enabled) {
            self.store.update(job_id, JobPatch::default().step(PipelineStep::PiiFlagging)).await?;
            pii_flagging::run(&mut segments);
        }

        let summary_result = if self.effective_flag(profile.as_ref(), |p| p.summary, self.config.summary_enabled) {
            self.store.update(job_id, JobPatch::default().step(PipelineStep::Summary)).await?;
            let prompt = profile.as_ref().and_then(|p| p.prompt).unwrap_or_else(default_summary_prompt);
            summary::run(&segments, self.llm.as_ref(), prompt).await
        } else {
            None
        };

        let result = InterpretationResult {
            language: input.language.clone(),
            context_profile: input.context_profile.clone(),
            segments,
            summary: summary_result,
        };

        if let Some(session_id) = &input.session_id {
            session_io::write_result(
                &self.config.sessions_dir,
                session_id,
                input.context_profile.as_deref(),
                &result,
            )?;
            session_io::mark_session_completed(&self.config.sessions_dir, session_id, job_id)?;
        }

        self.store
            .update(
                job_id,
                JobPatch::default()
                    .status(JobStatus::Completed)
                    .step(PipelineStep::Done)
                    .result(serde_json::to_value(&result)?),
            )
            .await?;

        Ok(())
    }

    /// If the job names a context profile that defines the flag, that value
    /// wins; otherwise fall back to the config default.
    fn effective_flag(&self, profile: Option<&whisper_common::context::ContextProfile>, from_profile: impl Fn(&whisper_common::context::ContextProfile) -> bool, config_default: bool) -> bool {
        match profile {
            Some(p) => from_profile(p),
            None => config_default,
        }
    }

    async fn audio_bytes(&self, input: &JobInput) -> anyhow::Result<Option<Vec<u8>>> {
        if let Some(b64) = &input.audio_base64 {
            use base64::engine::general_purpose::STANDARD as BASE64;
            use base64::Engine;
            return Ok(Some(BASE64.decode(b64)?));
        }
        if let Some(path) = &input.audio_path {
            return Ok(Some(tokio::fs::read(PathBuf::from(path)).await?));
        }
        if let Some(session_id) = &input.session_id {
            return Ok(session_io::read_audio(&self.config.sessions_dir, session_id).ok());
        }
        Ok(None)
    }

    async fn fail(&self, job_id: Uuid, input_session: Option<&str>, message: String) {
        error!(job_id = %job_id, error = %message, "pipeline job failed");
        if let Some(session_id) = input_session {
            if let Err(e) = session_io::mark_session_failed(&self.config.sessions_dir, session_id, job_id, &message) {
                error!(job_id = %job_id, error = %e, "failed to persist failure back to session.json");
            }
        }
        if let Err(e) = self
            .store
            .update(job_id, JobPatch::default().status(JobStatus::Failed).error(message))
            .await
        {
            error!(job_id = %job_id, error = %e, "failed to persist job failure to the job store");
        }
    }
}

impl JobRunner for Runner {
    fn run<'a>(&'a self, job_id: Uuid) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let session_id = self
                .store
                .get(job_id)
                .await
                .ok()
                .flatten()
                .and_then(|rec| serde_json::from_value::<JobInput>(rec.input_data).ok())
                .and_then(|input| input.session_id);

            if let Err(e) = self.execute(job_id).await {
                self.fail(job_id, session_id.as_deref(), e.to_string()).await;
            }
        })
    }
}

pub fn build_runner(config: Config, store: JobStore) -> Arc<dyn JobRunner> {
    Arc::new(Runner::new(config, store))
}

/// Build the `JobInput` value stored verbatim in `jobs.input_data` from a
/// `POST /jobs` body, validating the bare minimum spec.md requires.
pub fn validate_job_input(value: &Value) -> Result<(), crate::error::PipelineError> {
    let input: JobInput = serde_json::from_value(value.clone())
        .map_err(|e| crate::error::PipelineError::InvalidInput(e.to_string()))?;
    if input.segments.is_empty() && input.session_id.is_none() {
        return Err(crate::error::PipelineError::InvalidInput(
            "job input must carry segments or a session_id".to_string(),
        ));
    }
    Ok(())
}
