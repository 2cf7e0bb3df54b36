//! HTTP client to the Transcription Gateway — spec.md §4.3's "call A for
//! transcript". Built the same way as `pipeline::clients::GatewayClient`.

use std::time::Duration;

use serde::Deserialize;

use whisper_common::Segment;

#[derive(Debug, Clone, Deserialize)]
pub struct TranscribeResult {
    pub text: String,
    pub language: String,
    pub segments: Vec<Segment>,
}

#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
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

    pub async fn transcribe(&self, audio_bytes: &[u8], filename: &str, profile: &str) -> anyhow::Result<TranscribeResult> {
        let part = reqwest::multipart::Part::bytes(audio_bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str("audio/wav")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(format!("{}/transcribe", self.base_url))
            .query(&[("profile", profile)])
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}
