//! Environment-driven configuration — spec.md §6. All booleans honor the
//! `true|1|yes` (case-insensitive) rule; empty values fall back to default.

use std::path::PathBuf;
use std::time::Duration;

use whisper_common::context::CasingProfile;

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) if v.is_empty() => default,
        Ok(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub sessions_dir: PathBuf,
    pub jobs_db_path: PathBuf,
    pub max_concurrent_jobs: usize,

    pub gateway_url: String,
    pub llm_url: Option<String>,
    pub llm_model: String,
    pub diarizer_url: Option<String>,

    pub http_timeout: Duration,
    pub http_retries: u32,
    pub http_retry_backoff: f64,

    pub retry_enabled: bool,
    pub retry_with_large: bool,
    pub retry_beam_size: usize,
    pub lang_detect_enabled: bool,
    pub text_processing_enabled: bool,
    pub pii_enabled: bool,
    pub summary_enabled: bool,
    pub diarization_enabled: bool,
    pub casing_profile: CasingProfile,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("PIPELINE_BIND_ADDR", "127.0.0.1:8082"),
            sessions_dir: PathBuf::from(env_or("SESSIONS_DIR", "/app/transcriptions/sessions")),
            jobs_db_path: PathBuf::from(env_or("JOBS_DB_PATH", "/app/transcriptions/jobs.db")),
            max_concurrent_jobs: env_usize("MAX_CONCURRENT_JOBS", 2),

            gateway_url: env_or("WHISPER_API_URL", "http://127.0.0.1:8081"),
            llm_url: std::env::var("LLM_URL").ok().filter(|v| !v.is_empty()),
            llm_model: env_or("LLM_MODEL", "gpt-4o-mini"),
            diarizer_url: std::env::var("DIARIZER_URL").ok().filter(|v| !v.is_empty()),

            http_timeout: Duration::from_secs_f64(env_f64("HTTP_TIMEOUT", 30.0)),
            http_retries: env_usize("HTTP_RETRIES", 3) as u32,
            http_retry_backoff: env_f64("HTTP_RETRY_BACKOFF", 0.5),

            retry_enabled: env_bool("FEATURE_RETRY", true),
            retry_with_large: env_bool("FEATURE_RETRY_LARGE", false),
            retry_beam_size: env_usize("RETRY_BEAM_SIZE", 5),
            lang_detect_enabled: env_bool("FEATURE_LANG_DETECT", true),
            text_processing_enabled: env_bool("FEATURE_TEXT_PROCESSING", true),
            pii_enabled: env_bool("FEATURE_PII", true),
            summary_enabled: env_bool("FEATURE_SUMMARY", true),
            diarization_enabled: env_bool("FEATURE_DIARIZATION", false),
            casing_profile: parse_casing(&env_or("CASING_PROFILE", "meeting_notes")),
        }
    }
}

fn parse_casing(s: &str) -> CasingProfile {
    match s {
        "verbatim" => CasingProfile::Verbatim,
        "subtitle_friendly" => CasingProfile::SubtitleFriendly,
        _ => CasingProfile::MeetingNotes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_parsing_matches_spec_rule() {
        std::env::set_var("PL_TEST_BOOL_A", "Yes");
        std::env::set_var("PL_TEST_BOOL_B", "");
        std::env::set_var("PL_TEST_BOOL_C", "0");
        assert!(env_bool("PL_TEST_BOOL_A", false));
        assert!(env_bool("PL_TEST_BOOL_B", true));
        assert!(!env_bool("PL_TEST_BOOL_C", true));
        std::env::remove_var("PL_TEST_BOOL_A");
        std::env::remove_var("PL_TEST_BOOL_B");
        std::env::remove_var("PL_TEST_BOOL_C");
    }

    #[test]
    fn casing_defaults_to_meeting_notes() {
        assert_eq!(parse_casing("bogus"), CasingProfile::MeetingNotes);
        assert_eq!(parse_casing("verbatim"), CasingProfile::Verbatim);
    }
}
