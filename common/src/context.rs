//! Context profiles — the interpretation layer (spec.md §3/§4.2.3).
//!
//! Each context names which pipeline stages are enabled, the casing style for
//! `text_processing`, and an optional summary prompt template containing a
//! single `{text}` placeholder.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextProfileName {
    Raw,
    Meeting,
    Brainstorm,
    Journal,
    TechNotes,
}

impl ContextProfileName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextProfileName::Raw => "raw",
            ContextProfileName::Meeting => "meeting",
            ContextProfileName::Brainstorm => "brainstorm",
            ContextProfileName::Journal => "journal",
            ContextProfileName::TechNotes => "tech_notes",
        }
    }

    pub fn all() -> [ContextProfileName; 5] {
        [
            ContextProfileName::Raw,
            ContextProfileName::Meeting,
            ContextProfileName::Brainstorm,
            ContextProfileName::Journal,
            ContextProfileName::TechNotes,
        ]
    }
}

impl FromStr for ContextProfileName {
    type Err = ParseContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(ContextProfileName::Raw),
            "meeting" => Ok(ContextProfileName::Meeting),
            "brainstorm" => Ok(ContextProfileName::Brainstorm),
            "journal" => Ok(ContextProfileName::Journal),
            "tech_notes" => Ok(ContextProfileName::TechNotes),
            other => Err(ParseContextError(other.to_string())),
        }
    }
}

impl fmt::Display for ContextProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown context profile: {0}")]
pub struct ParseContextError(String);

/// Casing style applied by the `text_processing` stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasingProfile {
    Verbatim,
    MeetingNotes,
    SubtitleFriendly,
}

/// Static configuration for one context profile.
#[derive(Debug, Clone)]
pub struct ContextProfile {
    pub name: ContextProfileName,
    pub label: &'static str,
    pub description: &'static str,
    pub summary: bool,
    pub pii: bool,
    pub diarization: bool,
    pub text_processing: bool,
    pub casing: CasingProfile,
    pub prompt: Option<&'static str>,
}

const DEFAULT_SUMMARY_PROMPT: &str = "Du ar en assistent som sammanfattar transkriptioner pa svenska.\n\nGe en kort sammanfattning (max 3 meningar) och lista eventuella action items.\n\nTranskription:\n{text}\n\nSvara i JSON-format: {{\"summary\": \"...\", \"action_items\": [\"...\"]}}";

const MEETING_PROMPT: &str = "Du ar en assistent som sammanfattar motesanteckningar pa svenska.\n\nIdentifiera:\n1. Viktiga beslut som fattades\n2. Action items (vem ska gora vad)\n3. Nasta steg\n\nGe en kort sammanfattning (max 5 meningar) och lista alla action items.\n\nTranskription:\n{text}\n\nSvara i JSON-format: {{\"summary\": \"...\", \"action_items\": [\"...\"]}}";

const BRAINSTORM_PROMPT: &str = "Du ar en assistent som sammanfattar brainstorming-sessioner pa svenska.\n\nIdentifiera alla ideer som diskuterats och gruppera dem i kategorier.\nLista varje ide kort och koncist.\n\nTranskription:\n{text}\n\nSvara i JSON-format: {{\"summary\": \"...\", \"action_items\": [\"ide 1\", \"ide 2\"]}}";

const JOURNAL_PROMPT: &str = "Du ar en assistent som sammanfattar dagboksanteckningar pa svenska.\n\nFanga:\n1. Huvudsakliga reflektioner och kanslor\n2. Viktiga handelser\n3. Insikter och lardomar\n\nSkriv sammanfattningen i forsta person.\n\nTranskription:\n{text}\n\nSvara i JSON-format: {{\"summary\": \"...\", \"action_items\": []}}";

const TECH_NOTES_PROMPT: &str = "Du ar en assistent som sammanfattar tekniska anteckningar pa svenska.\n\nBevara alla tekniska termer, kodnamn och akronymer exakt som de namnts.\nStrukturera sammanfattningen med tydliga punkter.\n\nTranskription:\n{text}\n\nSvara i JSON-format: {{\"summary\": \"...\", \"action_items\": []}}";

impl ContextProfileName {
    /// Look up the static profile configuration for this context.
    pub fn profile(&self) -> ContextProfile {
        match self {
            ContextProfileName::Raw => ContextProfile {
                name: *self,
                label: "Ratt transkript",
                description: "Ingen efterbearbetning, ratt text fran ASR",
                summary: false,
                pii: false,
                diarization: false,
                text_processing: false,
                casing: CasingProfile::Verbatim,
                prompt: None,
            },
            ContextProfileName::Meeting => ContextProfile {
                name: *self,
                label: "Mote",
                description: "Motesanteckningar med beslut och actions",
                summary: true,
                pii: true,
                diarization: true,
                text_processing: true,
                casing: CasingProfile::MeetingNotes,
                prompt: Some(MEETING_PROMPT),
            },
            ContextProfileName::Brainstorm => ContextProfile {
                name: *self,
                label: "Brainstorm",
                description: "Lista och gruppera ideer fran brainstorming",
                summary: true,
                pii: false,
                diarization: false,
                text_processing: true,
                casing: CasingProfile::MeetingNotes,
                prompt: Some(BRAINSTORM_PROMPT),
            },
            ContextProfileName::Journal => ContextProfile {
                name: *self,
                label: "Dagbok",
                description: "Dagboksanteckningar och reflektioner",
                summary: true,
                pii: true,
                diarization: false,
                text_processing: true,
                casing: CasingProfile::MeetingNotes,
                prompt: Some(JOURNAL_PROMPT),
            },
            ContextProfileName::TechNotes => ContextProfile {
                name: *self,
                label: "Tekniska anteckningar",
                description: "Teknisk dokumentation, bevara facktermer",
                summary: true,
                pii: false,
                diarization: false,
                text_processing: false,
                casing: CasingProfile::Verbatim,
                prompt: Some(TECH_NOTES_PROMPT),
            },
        }
    }
}

pub fn default_summary_prompt() -> &'static str {
    DEFAULT_SUMMARY_PROMPT
}

/// List all registered context profiles — backs `GET /api/contexts`.
pub fn list_profiles() -> Vec<ContextProfile> {
    ContextProfileName::all().into_iter().map(|n| n.profile()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_disables_everything() {
        let p = ContextProfileName::Raw.profile();
        assert!(!p.summary && !p.pii && !p.diarization && !p.text_processing);
    }

    #[test]
    fn meeting_enables_diarization_and_pii() {
        let p = ContextProfileName::Meeting.profile();
        assert!(p.diarization);
        assert!(p.pii);
        assert!(p.prompt.unwrap().contains("{text}"));
    }

    #[test]
    fn list_profiles_has_five_entries() {
        assert_eq!(list_profiles().len(), 5);
    }
}
