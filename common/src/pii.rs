//! PII flag type and the Swedish regex patterns from spec.md §6.
//!
//! Flagging only — text is never masked (spec.md §1 Non-goals).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiType {
    Personnummer,
    Email,
    Telefon,
    Profanity,
}

impl PiiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiType::Personnummer => "personnummer",
            PiiType::Email => "email",
            PiiType::Telefon => "telefon",
            PiiType::Profanity => "profanity",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiiFlag {
    #[serde(rename = "type")]
    pub kind: PiiType,
    pub start_char: usize,
    pub end_char: usize,
    pub text: String,
}

/// Raw regex source strings, verbatim from spec.md §6. Kept here (rather than
/// compiled `Regex`es, which would make this crate depend on the `regex`
/// crate for every consumer) so the pipeline crate is the only place that
/// pays for compilation.
pub const PERSONNUMMER_RE: &str = r"\d{6,8}[-\s]?\d{4}";
pub const EMAIL_RE: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";
pub const TELEFON_RE: &str = r"(?:\+46|0)\s*[1-9]\d{0,2}[\s-]?\d{2,3}[\s-]?\d{2}[\s-]?\d{2}";

/// Swedish profanity word list, matched case-insensitively on word
/// boundaries. Verbatim from spec.md §6.
pub const PROFANITY_WORDS: &[&str] = &[
    "fan",
    "jävla",
    "jävlar",
    "helvete",
    "skit",
    "skita",
    "förbannad",
    "förbannade",
    "satan",
    "satans",
    "jävel",
    "jävligt",
    "faen",
    "fy fan",
];
