use serde::{Deserialize, Serialize};
use whisper_common::Segment;

#[derive(Debug, Deserialize)]
pub struct TranscribeQuery {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_true")]
    pub include_timestamps: bool,
}

fn default_language() -> String {
    "sv".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_probability: Option<f64>,
    pub segments: Vec<Segment>,
    pub duration: Option<f64>,
    pub backend: String,
    pub profile: String,
    pub inference_time: f64,
}

#[derive(Debug, Deserialize)]
pub struct RetryRequest {
    pub audio_base64: String,
    pub start: f64,
    pub end: f64,
    pub beam_size: usize,
    pub model: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct RetryResponse {
    pub segments: Vec<Segment>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_probability: Option<f64>,
    pub model: String,
    pub beam_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct WarmupQuery {
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WarmupResponse {
    pub status: String,
    pub profile: String,
    pub model: String,
    pub backend: String,
    pub load_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
