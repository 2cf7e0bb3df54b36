//! Stage 0 (`confidence`) — always on. Recomputes `low_confidence` per
//! segment and adds word-level confidence summaries — spec.md §4.2.3.
//!
//! The disjunction mirrors the Gateway's own heuristic (spec.md §4.1)
//! exactly; it is recomputed here rather than trusted from the wire because
//! a segment may have been replaced by the `retry` stage by the time this
//! runs a second time on re-interpretation.

use whisper_common::{Segment, Word};

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
    if !segment.words.is_empty() {
        let low = segment.words.iter().filter(|w| w.probability < 0.3).count();
        if (low as f64 / segment.words.len() as f64) > 0.3 {
            return true;
        }
    }
    false
}

/// Run the stage in place over every segment.
pub fn run(segments: &mut [Segment]) {
    for segment in segments.iter_mut() {
        segment.low_confidence = Some(is_low_confidence(segment));

        if segment.words.is_empty() {
            continue;
        }
        let probs: Vec<f64> = segment.words.iter().map(|w| w.probability).collect();
        let avg = probs.iter().sum::<f64>() / probs.len() as f64;
        let min = probs.iter().cloned().fold(f64::INFINITY, f64::min);
        segment.word_confidence_avg = Some(round4(avg));
        segment.word_confidence_min = Some(round4(min));
        segment.low_confidence_words = Some(
            segment
                .words
                .iter()
                .filter(|w: &&Word| w.probability < 0.3)
                .cloned()
                .collect(),
        );
    }
}

fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(p: f64) -> Word {
        Word { start: 0.0, end: 1.0, word: "x".into(), probability: p }
    }

    #[test]
    fn three_of_ten_is_not_low_confidence_four_of_ten_is() {
        let mut seg = Segment::new(0.0, 1.0, "hej");
        seg.words = vec![word(0.9); 7];
        seg.words.extend(vec![word(0.1); 3]);
        assert!(!is_low_confidence(&seg));

        let mut seg2 = Segment::new(0.0, 1.0, "hej");
        seg2.words = vec![word(0.9); 6];
        seg2.words.extend(vec![word(0.1); 4]);
        assert!(is_low_confidence(&seg2));
    }

    #[test]
    fn run_fills_word_confidence_summaries() {
        let mut seg = Segment::new(0.0, 1.0, "hej da");
        seg.words = vec![word(0.9), word(0.1)];
        let mut segments = vec![seg];
        run(&mut segments);
        assert_eq!(segments[0].word_confidence_avg, Some(0.5));
        assert_eq!(segments[0].word_confidence_min, Some(0.1));
        assert_eq!(segments[0].low_confidence_words.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn compression_ratio_boundary_is_strict() {
        let mut seg = Segment::new(0.0, 1.0, "hej");
        seg.compression_ratio = Some(2.4);
        assert!(!is_low_confidence(&seg));
        seg.compression_ratio = Some(2.41);
        assert!(is_low_confidence(&seg));
    }
}
