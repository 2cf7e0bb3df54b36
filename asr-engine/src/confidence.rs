//! Low-confidence heuristic, identical for both backends — spec.md §4.1.

use whisper_common::{Segment, Word};

/// A segment is low-confidence iff any of the four conditions below holds.
/// Missing fields never trigger. Thresholds are strict (`>`, `<`), not `>=`.
pub fn is_low_confidence(segment: &Segment) -> bool {
    if segment.avg_logprob.map(|v| v < -1.0).unwrap_or(false) {
        return true;
    }
    if segment.compression_ratio.map(|v| v > 2.4).unwrap_or(false) {
        return true;
    }
    if segment.no_speech_prob.map(|v| v > 0.6).unwrap_or(false) {
        return true;
    }
    if !segment.words.is_empty() && low_confidence_word_fraction_exceeds(&segment.words, 0.3) {
        return true;
    }
    false
}

fn low_confidence_word_fraction_exceeds(words: &[Word], fraction: f64) -> bool {
    let low = words.iter().filter(|w| w.probability < 0.3).count();
    (low as f64 / words.len() as f64) > fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(p: f64) -> Word {
        Word {
            start: 0.0,
            end: 1.0,
            word: "x".into(),
            probability: p,
        }
    }

    #[test]
    fn missing_fields_never_trigger() {
        let seg = Segment::new(0.0, 1.0, "hej");
        assert!(!is_low_confidence(&seg));
    }

    #[test]
    fn avg_logprob_threshold_is_strict() {
        let mut seg = Segment::new(0.0, 1.0, "hej");
        seg.avg_logprob = Some(-1.0);
        assert!(!is_low_confidence(&seg));
        seg.avg_logprob = Some(-1.0001);
        assert!(is_low_confidence(&seg));
    }

    #[test]
    fn compression_ratio_boundary_matches_spec() {
        let mut seg = Segment::new(0.0, 1.0, "hej");
        seg.compression_ratio = Some(2.4);
        assert!(!is_low_confidence(&seg));
        seg.compression_ratio = Some(2.41);
        assert!(is_low_confidence(&seg));
    }

    #[test]
    fn three_of_ten_low_words_is_not_low_confidence_four_of_ten_is() {
        let mut words = vec![word(0.9); 7];
        words.extend(vec![word(0.1); 3]);
        let mut seg = Segment::new(0.0, 1.0, "hej");
        seg.words = words;
        assert!(!is_low_confidence(&seg));

        let mut words = vec![word(0.9); 6];
        words.extend(vec![word(0.1); 4]);
        seg.words = words;
        assert!(is_low_confidence(&seg));
    }
}
