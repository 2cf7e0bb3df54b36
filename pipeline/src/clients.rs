//! HTTP clients to the Gateway, an optional diarizer, and an optional
//! OpenAI-compatible LLM endpoint — spec.md §1's "external collaborators",
//! modeled as plain `reqwest` calls (SPEC_FULL.md §7, Open Question 2):
//! a `reqwest::Client::builder().timeout(...)` plus URL validation.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::warn;

use whisper_common::Segment;

/// Transient-retry wrapper: up to `retries` attempts (so `retries=3` means
/// up to 3 total tries), exponential backoff `backoff_secs * 2^attempt`
/// between them — spec.md §4.2.3 ("Transient retries happen only for
/// Gateway calls").
pub async fn with_http_retry<T, F, Fut>(retries: u32, backoff_secs: f64, mut f: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    let attempts = retries.max(1);
    let mut last_err = None;
    for attempt in 0..attempts {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                warn!(attempt, error = %e, "gateway call failed, will retry if attempts remain");
                last_err = Some(e);
                if attempt + 1 < attempts {
                    let delay = backoff_secs * 2f64.powi(attempt as i32);
                    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("gateway call failed with no attempts made")))
}

#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RetryResponse {
    segments: Vec<Segment>,
}

impl GatewayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client builder"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `POST /transcribe/retry` — always against the whole blob, no
    /// pre-slicing (spec.md §4.1). Callers filter by overlap on their side
    /// if needed; the Gateway itself already does the `[start, end]`
    /// windowing described in spec.md.
    pub async fn retry_transcribe(
        &self,
        audio_bytes: &[u8],
        start: f64,
        end: f64,
        beam_size: usize,
        model: &str,
        language: &str,
    ) -> anyhow::Result<Vec<Segment>> {
        let body = serde_json::json!({
            "audio_base64": BASE64.encode(audio_bytes),
            "start": start,
            "end": end,
            "beam_size": beam_size,
            "model": model,
            "language": language,
        });
        let resp = self
            .client
            .post(format!("{}/transcribe/retry", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: RetryResponse = resp.json().await?;
        Ok(parsed.segments)
    }
}

/// One speaker turn as reported by the diarizer.
#[derive(Debug, Deserialize)]
pub struct DiarizedTurn {
    pub speaker_id: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Deserialize)]
struct DiarizeResponse {
    turns: Vec<DiarizedTurn>,
}

#[derive(Clone)]
pub struct DiarizerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DiarizerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client builder"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn diarize(&self, audio_bytes: &[u8]) -> anyhow::Result<Vec<DiarizedTurn>> {
        let body = serde_json::json!({ "audio_base64": BASE64.encode(audio_bytes) });
        let resp = self
            .client
            .post(format!("{}/diarize", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: DiarizeResponse = resp.json().await?;
        Ok(parsed.turns)
    }
}

#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl LlmClient {
    /// LLM calls have a fixed 30s timeout regardless of `HTTP_TIMEOUT`
    /// (spec.md §5).
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client builder"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Returns the raw assistant message content; the caller is responsible
    /// for parsing `{summary, action_items[]}` out of it with the
    /// fallback-to-raw-content rule (spec.md §4.2.3).
    pub async fn chat_completion(&self, prompt: &str) -> anyhow::Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: 0.3,
        };
        // `summary.py:58` posts to `{llm_url}/v1/chat/completions` — `LLM_URL`
        // is the bare OpenAI-compatible server root, not a `/v1`-suffixed base.
        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("empty choices in chat completion response"))
    }
}
