//! Stage 5 (`summary`), gated by profile/config — spec.md §4.2.3.
//!
//! Only runs when an LLM endpoint is configured. Any HTTP failure is logged
//! and treated as "no summary" rather than a job failure — none of the
//! stages are mandatory (spec.md §7).

use serde::Deserialize;
use tracing::warn;

use whisper_common::session::SummaryResult;
use whisper_common::Segment;

use crate::clients::LlmClient;

const MAX_PROMPT_CHARS: usize = 8000;

#[derive(Deserialize)]
struct ParsedSummary {
    summary: String,
    #[serde(default)]
    action_items: Vec<String>,
}

pub async fn run(segments: &[Segment], llm: Option<&LlmClient>, prompt_template: &str) -> Option<SummaryResult> {
    let llm = llm?;

    let text = concatenated_text(segments);
    let prompt = prompt_template.replace("{text}", &text);

    match llm.chat_completion(&prompt).await {
        Ok(content) => Some(parse_summary(&content)),
        Err(e) => {
            warn!(error = %e, "summary stage: LLM call failed, skipping summary");
            None
        }
    }
}

/// Builds the prompt from the raw ASR `text`, not `processed_text` —
/// `summary.py:45` joins `seg.get("text", "")` regardless of whether
/// `text_processing` ran, so the LLM always sees the unnormalized
/// transcript rather than the text-processing stage's output.
fn concatenated_text(segments: &[Segment]) -> String {
    let joined = segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ");
    truncate_chars(&joined, MAX_PROMPT_CHARS)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Falls back to `{summary: <raw content>, action_items: []}` if the
/// assistant content isn't the expected JSON shape.
fn parse_summary(content: &str) -> SummaryResult {
    match serde_json::from_str::<ParsedSummary>(content) {
        Ok(parsed) => SummaryResult { summary: parsed.summary, action_items: parsed.action_items },
        Err(_) => SummaryResult { summary: content.to_string(), action_items: Vec::new() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_json() {
        let result = parse_summary(r#"{"summary": "kort sammanfattning", "action_items": ["gor x"]}"#);
        assert_eq!(result.summary, "kort sammanfattning");
        assert_eq!(result.action_items, vec!["gor x".to_string()]);
    }

    #[test]
    fn falls_back_to_raw_content_on_parse_failure() {
        let result = parse_summary("det har ar bara vanlig text, inte json");
        assert_eq!(result.summary, "det har ar bara vanlig text, inte json");
        assert!(result.action_items.is_empty());
    }

    #[test]
    fn concatenation_uses_raw_text_and_truncates() {
        let long = "a".repeat(MAX_PROMPT_CHARS + 500);
        let segments = vec![Segment { processed_text: Some("normaliserad text".to_string()), ..Segment::new(0.0, 1.0, long.as_str()) }];
        let text = concatenated_text(&segments);
        assert_eq!(text.chars().count(), MAX_PROMPT_CHARS);
        assert!(long.starts_with(&text));
    }
}
