//! Stage 3 (`text_processing`), gated by profile/config — spec.md §4.2.3.
//!
//! `verbatim` is a strict no-op (segments are left bit-identical, backing
//! the idempotence property in spec.md §8). `meeting_notes` normalizes
//! unicode punctuation and capitalizes sentence starts into
//! `processed_text`. `subtitle_friendly` additionally wraps `processed_text`
//! into `subtitle_lines` capped at 42 characters and 2 lines.

use whisper_common::context::CasingProfile;
use whisper_common::Segment;

const MAX_SUBTITLE_CHARS: usize = 42;
const MAX_SUBTITLE_LINES: usize = 2;

pub fn run(segments: &mut [Segment], casing: CasingProfile) {
    if casing == CasingProfile::Verbatim {
        return;
    }

    for seg in segments.iter_mut() {
        let normalized = normalize_punctuation(&seg.text);
        let processed = capitalize_sentences(&normalized);
        if casing == CasingProfile::SubtitleFriendly {
            seg.subtitle_lines = Some(build_subtitle_lines(&processed));
        }
        seg.processed_text = Some(processed);
    }
}

fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect::<String>()
        .replace('\u{2026}', "...")
}

fn capitalize_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut capitalize_pending = true;
    let mut after_terminator = false;

    for c in text.chars() {
        if after_terminator {
            after_terminator = false;
            if c.is_whitespace() {
                capitalize_pending = true;
                out.push(c);
                continue;
            }
        }

        if capitalize_pending && c.is_whitespace() {
            out.push(c);
            continue;
        }

        if capitalize_pending && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            capitalize_pending = false;
        } else {
            out.push(c);
        }

        if c == '.' || c == '!' || c == '?' {
            after_terminator = true;
        }
    }
    out
}

/// Greedy word-wrap at `MAX_SUBTITLE_CHARS`; if wrapping would need more
/// than `MAX_SUBTITLE_LINES`, every word past the first line is crammed
/// onto the final line instead, per spec.md §4.2.3's overflow rule.
fn build_subtitle_lines(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let wrapped = wrap_words(&words, MAX_SUBTITLE_CHARS);
    if wrapped.len() <= MAX_SUBTITLE_LINES {
        return wrapped;
    }

    let mut lines = vec![wrapped[0].clone()];
    lines.push(wrapped[1..].join(" "));
    lines
}

fn wrap_words(words: &[&str], max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for &word in words {
        let candidate_len = if current.is_empty() { word.len() } else { current.len() + 1 + word.len() };
        if candidate_len > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbatim_is_identity() {
        let mut segments = vec![Segment::new(0.0, 1.0, "hej da")];
        run(&mut segments, CasingProfile::Verbatim);
        assert_eq!(segments[0].processed_text, None);
    }

    #[test]
    fn meeting_notes_normalizes_and_capitalizes() {
        let mut segments = vec![Segment::new(0.0, 1.0, "hej\u{2019} da. hur mar du\u{2026}")];
        run(&mut segments, CasingProfile::MeetingNotes);
        assert_eq!(segments[0].processed_text.as_deref(), Some("Hej' da. Hur mar du..."));
    }

    #[test]
    fn no_capitalization_without_whitespace_after_terminator() {
        assert_eq!(capitalize_sentences("hej.da"), "Hej.da");
    }

    #[test]
    fn subtitle_lines_wrap_and_cram_overflow_into_last_line() {
        let text = "detta ar en mycket lang mening som definitivt kommer att behova flera rader for att fa plats";
        let lines = build_subtitle_lines(text);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].len() <= MAX_SUBTITLE_CHARS);
        // overflow crammed into the last line even past the cap
        assert!(lines[1].split_whitespace().count() > 3);
    }

    #[test]
    fn short_text_fits_on_one_line() {
        let lines = build_subtitle_lines("hej da");
        assert_eq!(lines, vec!["hej da".to_string()]);
    }
}
