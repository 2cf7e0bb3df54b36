//! Stage 4 (`pii_flagging`), gated by profile/config — spec.md §4.2.3/§6.
//!
//! Flagging only, never masking (spec.md §1 Non-goals): the scanned text
//! (`processed_text` if present, else `text`) is left completely
//! unmodified. Patterns are verbatim from spec.md §6.

use std::sync::OnceLock;

use regex::Regex;

use whisper_common::pii::{PiiType, EMAIL_RE, PERSONNUMMER_RE, PROFANITY_WORDS, TELEFON_RE};
use whisper_common::{PiiFlag, Segment};

fn personnummer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PERSONNUMMER_RE).expect("personnummer regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_RE).expect("email regex"))
}

fn telefon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TELEFON_RE).expect("telefon regex"))
}

fn profanity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = PROFANITY_WORDS
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("profanity regex")
    })
}

pub fn run(segments: &mut [Segment]) {
    for seg in segments.iter_mut() {
        let text = seg.processed_text.as_deref().unwrap_or(&seg.text).to_string();
        let mut flags = scan(&text);
        flags.sort_by_key(|f| f.start_char);
        seg.has_pii = Some(!flags.is_empty());
        seg.pii_flags = Some(flags);
    }
}

fn scan(text: &str) -> Vec<PiiFlag> {
    let mut flags = Vec::new();
    push_matches(text, personnummer_re(), PiiType::Personnummer, &mut flags);
    push_matches(text, email_re(), PiiType::Email, &mut flags);
    push_matches(text, telefon_re(), PiiType::Telefon, &mut flags);
    push_matches(text, profanity_re(), PiiType::Profanity, &mut flags);
    flags
}

fn push_matches(text: &str, re: &Regex, kind: PiiType, out: &mut Vec<PiiFlag>) {
    for m in re.find_iter(text) {
        out.push(PiiFlag {
            kind,
            start_char: byte_to_char_idx(text, m.start()),
            end_char: byte_to_char_idx(text, m.end()),
            text: m.as_str().to_string(),
        });
    }
}

fn byte_to_char_idx(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_and_phone_are_flagged_text_unmodified() {
        let mut segments = vec![Segment::new(
            0.0,
            5.0,
            "Hej jag heter Anna min epost ar anna@example.se och mitt nummer ar 070-123 45 67",
        )];
        let original_text = segments[0].text.clone();
        run(&mut segments);

        assert_eq!(segments[0].text, original_text);
        assert_eq!(segments[0].has_pii, Some(true));
        let flags = segments[0].pii_flags.as_ref().unwrap();
        assert_eq!(flags.len(), 2);
        assert!(flags.iter().any(|f| matches!(f.kind, PiiType::Email)));
        assert!(flags.iter().any(|f| matches!(f.kind, PiiType::Telefon)));
    }

    #[test]
    fn profanity_matches_on_word_boundary_only() {
        let mut segments = vec![Segment::new(0.0, 1.0, "det var jävla bra")];
        run(&mut segments);
        assert_eq!(segments[0].has_pii, Some(true));

        let mut clean = vec![Segment::new(0.0, 1.0, "fana vajar i vinden")];
        run(&mut clean);
        assert_eq!(clean[0].has_pii, Some(false));
    }

    #[test]
    fn no_pii_yields_empty_flags_not_none() {
        let mut segments = vec![Segment::new(0.0, 1.0, "bara vanlig text har")];
        run(&mut segments);
        assert_eq!(segments[0].has_pii, Some(false));
        assert!(segments[0].pii_flags.as_ref().unwrap().is_empty());
    }
}
