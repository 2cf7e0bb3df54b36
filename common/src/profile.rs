//! Transcription profiles and the two ASR backends they dispatch to.
//!
//! See spec.md §3/§4.1. Four recognized profiles, each naming a backend, model
//! id, beam width and a chunking hint; `accurate` is the default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which ASR engine a profile dispatches to.
///
/// `Primary` is CPU-optimized, integer-quantized, supports beam search and
/// VAD-based silence trimming. `Accelerator` is GPU/accelerator-optimized,
/// half precision, greedy decoding only, no built-in VAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Primary,
    Accelerator,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Primary => write!(f, "primary"),
            Backend::Accelerator => write!(f, "accelerator"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionProfile {
    UltraRealtime,
    Fast,
    Accurate,
    HighestQuality,
}

impl Default for TranscriptionProfile {
    fn default() -> Self {
        TranscriptionProfile::Accurate
    }
}

/// Static configuration for a profile: backend, model id, beam width, compute
/// precision and a chunking hint (max single-inference audio length).
#[derive(Debug, Clone, Copy)]
pub struct ProfileSpec {
    pub backend: Backend,
    pub model_id: &'static str,
    pub beam_size: usize,
    pub precision: &'static str,
    pub chunk_hint_secs: f64,
}

impl TranscriptionProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionProfile::UltraRealtime => "ultra_realtime",
            TranscriptionProfile::Fast => "fast",
            TranscriptionProfile::Accurate => "accurate",
            TranscriptionProfile::HighestQuality => "highest_quality",
        }
    }

    /// Static configuration for this profile. See spec.md §3.
    pub fn spec(&self) -> ProfileSpec {
        match self {
            TranscriptionProfile::UltraRealtime => ProfileSpec {
                backend: Backend::Accelerator,
                model_id: "kb-whisper-small",
                beam_size: 1,
                precision: "fp16",
                chunk_hint_secs: 8.0,
            },
            TranscriptionProfile::Fast => ProfileSpec {
                backend: Backend::Accelerator,
                model_id: "kb-whisper-small",
                beam_size: 5,
                precision: "fp16",
                chunk_hint_secs: 15.0,
            },
            TranscriptionProfile::Accurate => ProfileSpec {
                backend: Backend::Primary,
                model_id: "kb-whisper-medium",
                beam_size: 5,
                precision: "int8",
                chunk_hint_secs: 30.0,
            },
            TranscriptionProfile::HighestQuality => ProfileSpec {
                backend: Backend::Primary,
                model_id: "kb-whisper-large",
                beam_size: 8,
                precision: "int8",
                chunk_hint_secs: 30.0,
            },
        }
    }
}

impl FromStr for TranscriptionProfile {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ultra_realtime" => Ok(TranscriptionProfile::UltraRealtime),
            "fast" => Ok(TranscriptionProfile::Fast),
            "accurate" => Ok(TranscriptionProfile::Accurate),
            "highest_quality" => Ok(TranscriptionProfile::HighestQuality),
            other => Err(ParseProfileError(other.to_string())),
        }
    }
}

impl fmt::Display for TranscriptionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown transcription profile: {0}")]
pub struct ParseProfileError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_profile_falls_back_is_caller_responsibility() {
        assert!("made_up".parse::<TranscriptionProfile>().is_err());
    }

    #[test]
    fn accurate_is_default_and_primary() {
        let p = TranscriptionProfile::default();
        assert_eq!(p, TranscriptionProfile::Accurate);
        assert_eq!(p.spec().backend, Backend::Primary);
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        for p in [
            TranscriptionProfile::UltraRealtime,
            TranscriptionProfile::Fast,
            TranscriptionProfile::Accurate,
            TranscriptionProfile::HighestQuality,
        ] {
            assert_eq!(p.as_str().parse::<TranscriptionProfile>().unwrap(), p);
        }
    }
}
