//! Stage 1 (`retry`), gated by `retry_enabled` (config) — spec.md §4.2.3.
//!
//! Strategy A: re-run every low-confidence segment's window through the
//! medium model at an elevated beam width; if the result is no longer
//! low-confidence, replace. Strategy B (only if `retry_with_large`): the
//! large model at the same beam, unconditionally replacing on response.
//!
//! Replacing a segment is a *merge*, not an overwrite: the gateway's retry
//! candidate carries only the raw ASR fields (start/end/text/words/
//! confidence signals) fresh off the re-transcription, so it is overlaid
//! onto a clone of the original segment rather than swapped in wholesale —
//! this is what keeps stage-0's `word_confidence_avg`/`word_confidence_min`/
//! `low_confidence_words` (and any other prior enrichment) on the segment
//! afterwards, matching `retry_transcribe.py`'s `{**seg, **best, ...}`.

use tracing::{info, warn};

use whisper_common::Segment;

use crate::clients::{with_http_retry, GatewayClient};
use crate::stages::confidence;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    segments: &mut Vec<Segment>,
    audio_bytes: &[u8],
    gateway: &GatewayClient,
    language: &str,
    retry_beam_size: usize,
    retry_with_large: bool,
    http_retries: u32,
    http_retry_backoff: f64,
) {
    for i in 0..segments.len() {
        if !segments[i].low_confidence.unwrap_or(false) {
            continue;
        }
        let (start, end) = (segments[i].start, segments[i].end);

        let medium = with_http_retry(http_retries, http_retry_backoff, || {
            gateway.retry_transcribe(audio_bytes, start, end, retry_beam_size, "medium", language)
        })
        .await;

        let replacement = match medium {
            Ok(candidates) => pick_overlapping(&candidates, start, end),
            Err(e) => {
                warn!(segment_start = start, error = %e, "retry stage: medium-model call failed, keeping original segment");
                None
            }
        };

        if let Some(candidate) = replacement {
            let merged = merge_retry_candidate(&segments[i], candidate);
            if !confidence::is_low_confidence(&merged) {
                let mut merged = merged;
                merged.low_confidence = Some(false);
                merged.retried = Some(true);
                merged.retry_model = Some("medium".to_string());
                info!(segment_start = start, "retry stage: medium-model retry resolved low confidence");
                segments[i] = merged;
                continue;
            }

            if retry_with_large {
                let large = with_http_retry(http_retries, http_retry_backoff, || {
                    gateway.retry_transcribe(audio_bytes, start, end, retry_beam_size, "large", language)
                })
                .await;

                if let Some(candidate) = large.ok().and_then(|c| pick_overlapping(&c, start, end)) {
                    let mut merged = merge_retry_candidate(&segments[i], candidate);
                    merged.low_confidence = Some(confidence::is_low_confidence(&merged));
                    merged.retried = Some(true);
                    merged.retry_model = Some("large".to_string());
                    info!(segment_start = start, "retry stage: large-model retry applied unconditionally");
                    segments[i] = merged;
                }
            }
        }
    }
}

/// Overlay a retry candidate's raw ASR fields onto a clone of the original
/// segment, so prior enrichment (word confidence summaries, speaker id,
/// PII flags, ...) survives the retry the way a `{**seg, **best}` dict
/// merge would.
fn merge_retry_candidate(original: &Segment, candidate: Segment) -> Segment {
    let mut merged = original.clone();
    merged.start = candidate.start;
    merged.end = candidate.end;
    merged.text = candidate.text;
    merged.words = candidate.words;
    merged.avg_logprob = candidate.avg_logprob;
    merged.compression_ratio = candidate.compression_ratio;
    merged.no_speech_prob = candidate.no_speech_prob;
    merged
}

/// Among the segments returned by a retry call, pick the one with the
/// greatest overlap against the original `[start, end]` window — the
/// retry call runs over the whole audio blob, so more than one segment may
/// come back even though only one original segment triggered the retry.
fn pick_overlapping(candidates: &[Segment], start: f64, end: f64) -> Option<Segment> {
    candidates
        .iter()
        .max_by(|a, b| overlap(a, start, end).partial_cmp(&overlap(b, start, end)).unwrap())
        .filter(|s| overlap(s, start, end) > 0.0)
        .cloned()
}

fn overlap(seg: &Segment, start: f64, end: f64) -> f64 {
    (seg.end.min(end) - seg.start.max(start)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_overlapping_prefers_greatest_overlap() {
        let a = Segment::new(0.0, 1.0, "a");
        let b = Segment::new(0.5, 2.0, "b");
        let picked = pick_overlapping(&[a, b], 0.4, 1.6).unwrap();
        assert_eq!(picked.text, "b");
    }

    #[test]
    fn pick_overlapping_none_when_disjoint() {
        let a = Segment::new(10.0, 11.0, "a");
        assert!(pick_overlapping(&[a], 0.0, 1.0).is_none());
    }

    #[test]
    fn merge_overlays_raw_fields_but_keeps_prior_enrichment() {
        let mut original = Segment::new(0.0, 1.0, "hej");
        original.word_confidence_avg = Some(0.4);
        original.word_confidence_min = Some(0.1);
        original.low_confidence_words = Some(vec![whisper_common::Word {
            start: 0.0,
            end: 1.0,
            word: "hej".to_string(),
            probability: 0.1,
        }]);
        original.speaker_id = Some("speaker_0".to_string());

        let mut candidate = Segment::new(0.0, 1.0, "hej da");
        candidate.avg_logprob = Some(-0.2);

        let merged = merge_retry_candidate(&original, candidate);

        assert_eq!(merged.text, "hej da");
        assert_eq!(merged.avg_logprob, Some(-0.2));
        // prior enrichment from earlier stages survives the merge.
        assert_eq!(merged.word_confidence_avg, Some(0.4));
        assert_eq!(merged.word_confidence_min, Some(0.1));
        assert_eq!(merged.low_confidence_words.as_ref().map(|w| w.len()), Some(1));
        assert_eq!(merged.speaker_id.as_deref(), Some("speaker_0"));
    }
}
