//! On-disk session metadata — spec.md §3.
//!
//! A session is a directory `{UTC-timestamp}_{profile}` holding `audio.wav`,
//! `session.json` (this type, plus raw segments), and zero or more
//! `processed.json` / `interpreted_{context}.json` pipeline outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::JobStatus;
use crate::segment::Segment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: String,
    pub profile: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration: f64,
    pub chunks: usize,
    pub text: String,
    pub segments: Vec<Segment>,
    pub audio_file: String,
    pub audio_format: String,
    pub sample_rate: u32,
    pub channels: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SessionMetadata {
    /// Session ids are `<YYYY-MM-DD_HH-MM-SS>_<profile>` in UTC, sampled once
    /// per session — spec.md §4.3.
    pub fn derive_id(started_at: DateTime<Utc>, profile: &str) -> String {
        format!("{}_{}", started_at.format("%Y-%m-%d_%H-%M-%S"), profile)
    }
}

/// Output of a pipeline run, written to `processed.json` or
/// `interpreted_{context}.json` — spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretationResult {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_profile: Option<String>,
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    #[serde(default)]
    pub action_items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn derive_id_matches_expected_shape() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 1, 12, 30, 0).unwrap();
        assert_eq!(
            SessionMetadata::derive_id(ts, "accurate"),
            "2026-02-01_12-30-00_accurate"
        );
    }
}
