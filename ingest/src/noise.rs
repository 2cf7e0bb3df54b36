//! Text-level noise check for real-time transcript frames — spec.md §4.3's
//! "transcription responses whose trimmed text is empty or matches the
//! noise regex are not sent to the caller and not buffered as transcripts".
//! Mirrors the punctuation-only check `asr_engine::noise_filter` applies to
//! full segments, scoped to just the combined text since realtime frames
//! don't carry word-level probabilities worth re-checking here.

const PUNCTUATION_CHARS: &[char] =
    &[' ', '\t', '\n', '\r', '.', '!', '?', ',', ';', ':', '-', '—', '–', '…', '\'', '"', '«', '»', '(', ')', '[', ']'];

pub fn is_noise_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.chars().all(|c| PUNCTUATION_CHARS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_spec_examples() {
        assert!(is_noise_text("..."));
        assert!(is_noise_text(" . , "));
        assert!(is_noise_text(""));
        assert!(!is_noise_text("hej"));
    }
}
