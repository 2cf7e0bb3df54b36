//! Shared decode-result assembly for both backends: segment/word extraction
//! from a finished `whisper_rs` state, plus the two derived confidence
//! signals whisper.cpp doesn't hand back directly (`avg_logprob`,
//! `compression_ratio`).

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

use whisper_common::{Segment, Word};
use whisper_rs::WhisperState;

use crate::error::{EngineError, Result};

/// zlib-compression ratio of the segment text, the same signal
/// faster-whisper-style pipelines use to flag repetitive/garbled output.
/// Empty text compresses to nothing meaningful, so it is defined as 0.0
/// (never triggers the `> 2.4` low-confidence threshold).
pub fn compression_ratio(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    if encoder.write_all(text.as_bytes()).is_err() {
        return 0.0;
    }
    let compressed = match encoder.finish() {
        Ok(bytes) => bytes,
        Err(_) => return 0.0,
    };
    if compressed.is_empty() {
        return 0.0;
    }
    text.len() as f64 / compressed.len() as f64
}

/// Centiseconds (whisper.cpp's native segment timestamp unit) to seconds,
/// rounded to 3 decimal places per spec.md §4.1's result-shape rounding rule.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

pub fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

/// Build enriched [`Segment`]s from a completed whisper.cpp inference state.
/// `time_offset_secs` shifts every timestamp, used when the backend ran
/// inference over a VAD-trimmed sub-slice of the original buffer.
pub fn segments_from_state(state: &WhisperState, time_offset_secs: f64) -> Result<Vec<Segment>> {
    let num_segments = state
        .full_n_segments()
        .map_err(|e| EngineError::Inference(e.to_string()))?;

    let mut segments = Vec::with_capacity(num_segments as usize);
    for i in 0..num_segments {
        let text = state
            .full_get_segment_text(i)
            .map_err(|e| EngineError::Inference(e.to_string()))?
            .trim()
            .to_string();

        let t0 = state
            .full_get_segment_t0(i)
            .map_err(|e| EngineError::Inference(e.to_string()))? as f64
            * 0.01;
        let t1 = state
            .full_get_segment_t1(i)
            .map_err(|e| EngineError::Inference(e.to_string()))? as f64
            * 0.01;

        let no_speech_prob = state.full_get_segment_no_speech_prob(i).ok();

        let n_tokens = state.full_n_tokens(i).unwrap_or(0);
        let mut words = Vec::new();
        let mut logprob_sum = 0.0f64;
        let mut logprob_count = 0usize;
        for t in 0..n_tokens {
            let Ok(token_text) = state.full_get_token_text(i, t) else {
                continue;
            };
            let trimmed = token_text.trim();
            if trimmed.is_empty() || (trimmed.starts_with('[') && trimmed.ends_with(']')) {
                continue;
            }
            let Ok(token_data) = state.full_get_token_data(i, t) else {
                continue;
            };
            logprob_sum += token_data.plog as f64;
            logprob_count += 1;
            words.push(Word {
                start: round3(token_data.t0 as f64 * 0.01 + time_offset_secs),
                end: round3(token_data.t1 as f64 * 0.01 + time_offset_secs),
                word: trimmed.to_string(),
                probability: round4(token_data.p as f64),
            });
        }

        let avg_logprob = if logprob_count > 0 {
            Some(round4(logprob_sum / logprob_count as f64))
        } else {
            None
        };

        let mut segment = Segment::new(
            round3(t0 + time_offset_secs),
            round3(t1 + time_offset_secs),
            text.clone(),
        );
        segment.words = words;
        segment.avg_logprob = avg_logprob;
        segment.compression_ratio = Some(round4(compression_ratio(&text)));
        segment.no_speech_prob = no_speech_prob.map(round4);
        segments.push(segment);
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repetitive_text_compresses_better_than_varied_text() {
        let repetitive = "ja ja ja ja ja ja ja ja ja ja";
        let varied = "den snabba bruna raven hoppar over den lata hunden";
        assert!(compression_ratio(repetitive) > compression_ratio(varied));
    }

    #[test]
    fn empty_text_has_zero_ratio() {
        assert_eq!(compression_ratio(""), 0.0);
    }
}
