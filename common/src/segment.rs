//! ASR output types: `Word`, `Segment`.
//!
//! A `Segment` is enriched in place as it passes through the pipeline stages.
//! Enrichment fields are additive only — see the `low_confidence` invariant in
//! spec.md §3: original ASR fields are never removed, and `start <= end` holds
//! at every stage.

use serde::{Deserialize, Serialize};

use crate::pii::PiiFlag;

/// A single word-level timestamp, as produced by the ASR backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub start: f64,
    pub end: f64,
    pub word: String,
    pub probability: f64,
}

/// A timestamped utterance, enriched in place by pipeline stages.
///
/// Fields beyond the raw ASR output are `Option` and skipped when absent so
/// that a segment fresh off the Gateway serializes identically to one that
/// has been through zero pipeline stages — required for the
/// `retry_enabled=false` idempotence property in spec.md §8.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<Word>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_logprob: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_speech_prob: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_confidence: Option<bool>,

    // Enriched by `language_detect`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_switch: Option<bool>,

    // Enriched by `text_processing`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_lines: Option<Vec<String>>,

    // Enriched by `pii_flagging`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pii_flags: Option<Vec<PiiFlag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_pii: Option<bool>,

    // Enriched by `diarization`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<String>,

    // Enriched by `confidence`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_confidence_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_confidence_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_confidence_words: Option<Vec<Word>>,

    // Enriched by `retry`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retried: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_model: Option<String>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// `true` once a [`language_detect`](crate) style stage has flagged the
    /// segment as deviating from the file-level language.
    pub fn switched_language(&self) -> bool {
        self.language_switch.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_non_negative() {
        let seg = Segment::new(3.0, 1.0, "x");
        assert_eq!(seg.duration(), 0.0);
    }

    #[test]
    fn unset_enrichment_fields_are_omitted_from_json() {
        let seg = Segment::new(0.0, 1.0, "hej");
        let json = serde_json::to_value(&seg).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("speaker_id"));
        assert!(!obj.contains_key("pii_flags"));
        assert!(!obj.contains_key("words"));
    }
}
