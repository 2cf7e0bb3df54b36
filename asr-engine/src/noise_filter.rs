//! Noise filter applied only to accelerator output, which has no VAD gate to
//! reject silence/mouth-noise segments on its own — spec.md §4.1.

use whisper_common::Segment;

const PUNCTUATION_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r', '.', '!', '?', ',', ';', ':', '-', '—', '–', '…', '\'', '"', '«', '»',
    '(', ')', '[', ']',
];

fn is_all_punctuation(text: &str) -> bool {
    text.chars().all(|c| PUNCTUATION_CHARS.contains(&c))
}

/// `true` if this segment should be dropped as noise.
pub fn is_noise(segment: &Segment) -> bool {
    let trimmed = segment.text.trim();
    if trimmed.is_empty() {
        return true;
    }
    if is_all_punctuation(trimmed) {
        return true;
    }
    if !segment.words.is_empty() && segment.words.iter().all(|w| w.probability < 0.01) {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use whisper_common::Word;

    #[test]
    fn matches_spec_examples() {
        assert!(is_noise(&Segment::new(0.0, 1.0, "...")));
        assert!(is_noise(&Segment::new(0.0, 1.0, " . , ")));
        assert!(is_noise(&Segment::new(0.0, 1.0, "")));
        assert!(!is_noise(&Segment::new(0.0, 1.0, "hej")));
    }

    #[test]
    fn all_words_below_threshold_is_noise() {
        let mut seg = Segment::new(0.0, 1.0, "mm mm");
        seg.words = vec![
            Word { start: 0.0, end: 0.5, word: "mm".into(), probability: 0.005 },
            Word { start: 0.5, end: 1.0, word: "mm".into(), probability: 0.009 },
        ];
        assert!(is_noise(&seg));
    }

    #[test]
    fn one_confident_word_is_not_noise() {
        let mut seg = Segment::new(0.0, 1.0, "mm hej");
        seg.words = vec![
            Word { start: 0.0, end: 0.5, word: "mm".into(), probability: 0.005 },
            Word { start: 0.5, end: 1.0, word: "hej".into(), probability: 0.9 },
        ];
        assert!(!is_noise(&seg));
    }
}
